//! Remote credential service interface
//!
//! `KeyStore` depends only on these operations. The API Management client in
//! `kura-azure` implements them over HTTP; tests use an in-memory fake.
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


use crate::error::KeyResult;
use crate::projection::{CreateSubscription, RemoteSubscription, SubscriptionSecrets};
use crate::scope::ServiceLocator;
use async_trait::async_trait;

/// Trait for subscription key backends
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Instance this service is bound to
    fn locator(&self) -> &ServiceLocator;

    /// List subscriptions, optionally only those of one product.
    /// Key material is not included.
    async fn list_subscriptions(&self, product_id: Option<&str>) -> KeyResult<Vec<RemoteSubscription>>;

    /// Fetch both keys of a subscription
    async fn list_secrets(&self, name: &str) -> KeyResult<SubscriptionSecrets>;

    /// Create a subscription, or update it if `name` already exists
    async fn create_or_update(
        &self,
        name: &str,
        request: &CreateSubscription,
    ) -> KeyResult<RemoteSubscription>;

    /// Delete a subscription
    async fn delete(&self, name: &str) -> KeyResult<()>;
}
