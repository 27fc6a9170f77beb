//! In-memory credential service for key store tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use kura_keys::projection::{
    CreateSubscription, RemoteSubscription, RemoteSubscriptionProperties, SubscriptionSecrets,
    SubscriptionState,
};
use kura_keys::scope::{extract_suffix, product_id};
use kura_keys::{CredentialService, KeyError, KeyResult, ServiceLocator};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    subscriptions: Vec<(RemoteSubscription, SubscriptionSecrets)>,
    fail_create: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_secrets: HashSet<String>,
    rotate_on_create: HashSet<String>,
    calls: Vec<String>,
}

pub struct InMemoryService {
    locator: ServiceLocator,
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn new(subscription_id: &str, resource_group: &str, service_name: &str) -> Self {
        Self {
            locator: ServiceLocator::new(subscription_id, resource_group, service_name),
            state: Mutex::new(State::default()),
        }
    }

    /// Seed a subscription whose scope is `suffix` under this instance
    pub fn seed(&self, name: &str, display_name: &str, suffix: &str, primary: &str, secondary: &str) {
        let remote = RemoteSubscription {
            id: Some(self.subscription_id(name)),
            name: Some(name.to_string()),
            kind: Some("Microsoft.ApiManagement/service/subscriptions".to_string()),
            properties: Some(RemoteSubscriptionProperties {
                owner_id: None,
                scope: Some(self.locator.scope_for(suffix)),
                display_name: Some(display_name.to_string()),
                state: SubscriptionState::Active,
                created_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
                start_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
                end_date: None,
                expiration_date: None,
                notification_date: None,
                state_comment: None,
                allow_tracing: Some(false),
            }),
        };
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .push((remote, SubscriptionSecrets::new(primary, secondary)));
    }

    pub fn fail_create(&self, name: &str) {
        self.state.lock().unwrap().fail_create.insert(name.to_string());
    }

    pub fn fail_delete(&self, name: &str) {
        self.state.lock().unwrap().fail_delete.insert(name.to_string());
    }

    pub fn fail_secrets(&self, name: &str) {
        self.state.lock().unwrap().fail_secrets.insert(name.to_string());
    }

    /// Store fresh keys instead of the requested ones when `name` is created
    pub fn rotate_on_create(&self, name: &str) {
        self.state.lock().unwrap().rotate_on_create.insert(name.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter_map(|(r, _)| r.name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<(RemoteSubscription, SubscriptionSecrets)> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|(r, _)| r.name.as_deref() == Some(name))
            .cloned()
    }

    /// Calls made so far, as `"<operation> <name>"`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn subscription_id(&self, name: &str) -> String {
        format!("{}/subscriptions/{}", self.locator.resource_id(), name)
    }
}

#[async_trait]
impl CredentialService for InMemoryService {
    fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    async fn list_subscriptions(&self, product: Option<&str>) -> KeyResult<Vec<RemoteSubscription>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list {}", product.unwrap_or("*")));
        Ok(state
            .subscriptions
            .iter()
            .map(|(r, _)| r.clone())
            .filter(|r| match product {
                None => true,
                Some(wanted) => {
                    let scope = r
                        .properties
                        .as_ref()
                        .and_then(|p| p.scope.clone())
                        .unwrap_or_default();
                    product_id(&extract_suffix(&scope)) == Some(wanted)
                }
            })
            .collect())
    }

    async fn list_secrets(&self, name: &str) -> KeyResult<SubscriptionSecrets> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("secrets {}", name));
        if state.fail_secrets.contains(name) {
            return Err(KeyError::Remote(format!("secrets unavailable for {}", name)));
        }
        state
            .subscriptions
            .iter()
            .find(|(r, _)| r.name.as_deref() == Some(name))
            .map(|(_, s)| s.clone())
            .ok_or_else(|| KeyError::NotFound(name.to_string()))
    }

    async fn create_or_update(
        &self,
        name: &str,
        request: &CreateSubscription,
    ) -> KeyResult<RemoteSubscription> {
        let id = self.subscription_id(name);
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {}", name));
        if state.fail_create.contains(name) {
            return Err(KeyError::Remote(format!("create rejected for {}", name)));
        }

        let props = &request.properties;
        let remote = RemoteSubscription {
            id: Some(id),
            name: Some(name.to_string()),
            kind: Some("Microsoft.ApiManagement/service/subscriptions".to_string()),
            properties: Some(RemoteSubscriptionProperties {
                owner_id: props.owner_id.clone(),
                scope: Some(props.scope.clone()),
                display_name: Some(props.display_name.clone()),
                state: props.state.unwrap_or(SubscriptionState::Submitted),
                created_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
                start_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
                end_date: None,
                expiration_date: None,
                notification_date: None,
                state_comment: None,
                allow_tracing: props.allow_tracing,
            }),
        };
        let secrets = if state.rotate_on_create.contains(name) {
            SubscriptionSecrets::new(format!("{}-new-p", name), format!("{}-new-s", name))
        } else {
            SubscriptionSecrets {
                primary_key: props.primary_key.clone(),
                secondary_key: props.secondary_key.clone(),
            }
        };

        state.subscriptions.retain(|(r, _)| r.name.as_deref() != Some(name));
        state.subscriptions.push((remote.clone(), secrets));
        Ok(remote)
    }

    async fn delete(&self, name: &str) -> KeyResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {}", name));
        if state.fail_delete.contains(name) {
            return Err(KeyError::Remote(format!("delete rejected for {}", name)));
        }
        let before = state.subscriptions.len();
        state.subscriptions.retain(|(r, _)| r.name.as_deref() != Some(name));
        if state.subscriptions.len() == before {
            return Err(KeyError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
