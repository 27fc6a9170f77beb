//! API Management subscription client
//!
//! Talks to the Resource Manager endpoints under
//! `/subscriptions/{id}/resourceGroups/{rg}/providers/Microsoft.ApiManagement/service/{name}`.
//! Every call is a single request with the transport's default timeout and
//! no retries.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{ApimError, ApimResult};
use crate::identity;
use async_trait::async_trait;
use kura_keys::projection::{CreateSubscription, RemoteSubscription, SubscriptionSecrets};
use kura_keys::{CredentialService, KeyResult, ServiceLocator};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, IF_MATCH};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2022-08-01";

/// API Management client configuration
#[derive(Debug, Clone)]
pub struct ApimConfig {
    /// Resource Manager endpoint, without trailing slash
    pub endpoint: String,
    pub api_version: String,
    /// Bearer token; the Azure CLI is asked when absent
    pub access_token: Option<String>,
}

impl Default for ApimConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
        }
    }
}

impl ApimConfig {
    pub fn new(endpoint: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Token audience for the configured endpoint
    fn resource(&self) -> String {
        format!("{}/", self.endpoint)
    }
}

/// One page of a Resource Manager collection
#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

/// Client for one API Management instance
pub struct ApimClient {
    locator: ServiceLocator,
    config: ApimConfig,
    token: String,
    client: reqwest::Client,
}

impl ApimClient {
    /// Resolve the cloud subscription and a token, then build the client.
    ///
    /// Fails before any subscription is touched when identity or token
    /// resolution fails.
    pub async fn connect(
        config: ApimConfig,
        subscription_id: Option<String>,
        resource_group: &str,
        service_name: &str,
    ) -> ApimResult<Self> {
        let subscription_id = match subscription_id.filter(|s| !s.trim().is_empty()) {
            Some(id) => id,
            None => identity::resolve_subscription_id().await?,
        };

        let token = match config.access_token.clone() {
            Some(token) => token,
            None => identity::cli_access_token(&config.resource()).await?,
        };

        let locator = ServiceLocator::new(subscription_id, resource_group, service_name);
        info!(instance = %locator, subscription = %locator.subscription_id, "Connected to API Management");
        Self::with_token(config, locator, token)
    }

    /// Build a client with an already known token
    pub fn with_token(
        config: ApimConfig,
        locator: ServiceLocator,
        token: impl Into<String>,
    ) -> ApimResult<Self> {
        if locator.resource_group.is_empty() || locator.service_name.is_empty() {
            return Err(ApimError::Configuration(
                "resource group and service name are required".to_string(),
            ));
        }

        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            locator,
            config,
            token: token.into(),
            client,
        })
    }

    /// URL of `path` below the instance resource
    fn service_url(&self, path: &str) -> String {
        format!(
            "{}{}/{}?api-version={}",
            self.config.endpoint,
            self.locator.resource_id(),
            path,
            self.config.api_version
        )
    }

    fn subscriptions_url(&self, product_id: Option<&str>) -> String {
        match product_id {
            Some(product) => self.service_url(&format!("products/{}/subscriptions", product)),
            None => self.service_url("subscriptions"),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// Send a request and map error statuses
    async fn execute(&self, request: RequestBuilder, what: &str) -> ApimResult<reqwest::Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApimError::Authentication(format!("{} ({}): {}", what, status, body))
            }
            StatusCode::NOT_FOUND => ApimError::NotFound(what.to_string()),
            _ => ApimError::Api {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> ApimResult<T> {
        let response = self.execute(request, what).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApimError::InvalidResponse(format!("{}: {}", what, e)))
    }

    /// Follow `nextLink` until the collection is exhausted
    pub async fn list_all(&self, product_id: Option<&str>) -> ApimResult<Vec<RemoteSubscription>> {
        let mut url = Some(self.subscriptions_url(product_id));
        let mut items = Vec::new();

        while let Some(next) = url {
            let page: Page<RemoteSubscription> = self
                .execute_json(self.client.get(&next), "list subscriptions")
                .await?;
            debug!(count = page.value.len(), "Fetched subscription page");
            items.extend(page.value);
            url = page.next_link.filter(|link| !link.is_empty());
        }

        Ok(items)
    }

    pub async fn secrets(&self, name: &str) -> ApimResult<SubscriptionSecrets> {
        let url = self.service_url(&format!("subscriptions/{}/listSecrets", name));
        let request = self.client.post(&url).header(CONTENT_LENGTH, "0");
        self.execute_json(request, &format!("subscription {}", name))
            .await
    }

    pub async fn put_subscription(
        &self,
        name: &str,
        body: &CreateSubscription,
    ) -> ApimResult<RemoteSubscription> {
        let url = self.service_url(&format!("subscriptions/{}", name));
        self.execute_json(self.client.put(&url).json(body), &format!("subscription {}", name))
            .await
    }

    pub async fn delete_subscription(&self, name: &str) -> ApimResult<()> {
        let url = self.service_url(&format!("subscriptions/{}", name));
        let request = self.client.delete(&url).header(IF_MATCH, "*");
        self.execute(request, &format!("subscription {}", name))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialService for ApimClient {
    fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    async fn list_subscriptions(&self, product_id: Option<&str>) -> KeyResult<Vec<RemoteSubscription>> {
        Ok(self.list_all(product_id).await?)
    }

    async fn list_secrets(&self, name: &str) -> KeyResult<SubscriptionSecrets> {
        Ok(self.secrets(name).await?)
    }

    async fn create_or_update(
        &self,
        name: &str,
        request: &CreateSubscription,
    ) -> KeyResult<RemoteSubscription> {
        Ok(self.put_subscription(name, request).await?)
    }

    async fn delete(&self, name: &str) -> KeyResult<()> {
        Ok(self.delete_subscription(name).await?)
    }
}
