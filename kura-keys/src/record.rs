//! Persisted subscription key records
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


use serde::{Deserialize, Serialize};

/// Entity name of the built-in subscription every instance provisions
pub const MASTER_SUBSCRIPTION: &str = "master";

/// Entity name of a subscription (the `sid` used in resource paths)
pub type SubscriptionName = String;

/// One subscription key pair as stored in a snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Full remote resource identifier
    pub id: String,
    /// Entity name, reused as the restore key
    pub name: SubscriptionName,
    /// Resource type
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: CredentialProperties,
}

/// Subscription properties, flattened to plain strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub scope: String,
    pub display_name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<String>,
    pub primary_key: String,
    pub secondary_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_comment: Option<String>,
    #[serde(default)]
    pub allow_tracing: bool,
}

impl CredentialRecord {
    /// Whether this is the built-in `master` subscription
    pub fn is_builtin(&self) -> bool {
        self.name == MASTER_SUBSCRIPTION
    }

    pub fn display_name(&self) -> &str {
        &self.properties.display_name
    }

    /// The `(primary, secondary)` pair used to match records across snapshots
    pub fn key_pair(&self) -> (&str, &str) {
        (
            self.properties.primary_key.as_str(),
            self.properties.secondary_key.as_str(),
        )
    }
}

/// Drop the built-in `master` subscription, keeping order
pub fn without_builtin(records: &[CredentialRecord]) -> Vec<&CredentialRecord> {
    records.iter().filter(|r| !r.is_builtin()).collect()
}
