//! Wire schema of the remote subscription API and its projection to records
//!
//! The remote side uses typed states and structured timestamps, and returns
//! key material only through a separate secrets call. Snapshot records are
//! flat: plain-string state, `YYYY-MM-DDTHH:MM:SSZ` timestamps, and both keys
//! attached.
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


use crate::error::{KeyError, KeyResult};
use crate::record::{CredentialProperties, CredentialRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used in snapshot files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Subscription lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Active,
    Suspended,
    Submitted,
    Rejected,
    Cancelled,
    Expired,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Active => "active",
            SubscriptionState::Suspended => "suspended",
            SubscriptionState::Submitted => "submitted",
            SubscriptionState::Rejected => "rejected",
            SubscriptionState::Cancelled => "cancelled",
            SubscriptionState::Expired => "expired",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionState {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionState::Active),
            "suspended" => Ok(SubscriptionState::Suspended),
            "submitted" => Ok(SubscriptionState::Submitted),
            "rejected" => Ok(SubscriptionState::Rejected),
            "cancelled" => Ok(SubscriptionState::Cancelled),
            "expired" => Ok(SubscriptionState::Expired),
            other => Err(KeyError::InvalidRecord(format!(
                "unknown subscription state '{}'",
                other
            ))),
        }
    }
}

/// Subscription contract as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<RemoteSubscriptionProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSubscriptionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub state: SubscriptionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_tracing: Option<bool>,
}

/// Key material returned by the dedicated secrets call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSecrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
}

impl SubscriptionSecrets {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary_key: Some(primary.into()),
            secondary_key: Some(secondary.into()),
        }
    }

    /// Both keys, or `MissingSecrets` if either is absent or empty
    pub fn require(&self, name: &str) -> KeyResult<(&str, &str)> {
        match (non_empty(&self.primary_key), non_empty(&self.secondary_key)) {
            (Some(primary), Some(secondary)) => Ok((primary, secondary)),
            _ => Err(KeyError::MissingSecrets(name.to_string())),
        }
    }
}

/// Create-or-update request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub properties: CreateSubscriptionProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionProperties {
    pub scope: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SubscriptionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_tracing: Option<bool>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a snapshot timestamp; RFC 3339 input is accepted as well
pub fn parse_timestamp(value: &str) -> KeyResult<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| KeyError::InvalidRecord(format!("invalid timestamp '{}': {}", value, e)))
}

fn parse_optional_timestamp(value: &Option<String>) -> KeyResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

/// Project a listed subscription plus its secrets into a snapshot record
pub fn project_record(
    remote: &RemoteSubscription,
    secrets: &SubscriptionSecrets,
) -> KeyResult<CredentialRecord> {
    let name = remote
        .name
        .clone()
        .ok_or_else(|| KeyError::InvalidRecord("subscription without a name".to_string()))?;
    let props = remote
        .properties
        .as_ref()
        .ok_or_else(|| KeyError::InvalidRecord(format!("subscription {} has no properties", name)))?;
    let (primary_key, secondary_key) = secrets.require(&name)?;

    Ok(CredentialRecord {
        id: remote.id.clone().unwrap_or_default(),
        kind: remote.kind.clone().unwrap_or_default(),
        properties: CredentialProperties {
            owner_id: props.owner_id.clone(),
            scope: props.scope.clone().unwrap_or_default(),
            display_name: props.display_name.clone().unwrap_or_default(),
            state: props.state.as_str().to_string(),
            created_date: props.created_date.as_ref().map(format_timestamp),
            start_date: props.start_date.as_ref().map(format_timestamp),
            end_date: props.end_date.as_ref().map(format_timestamp),
            expiration_date: props.expiration_date.as_ref().map(format_timestamp),
            notification_date: props.notification_date.as_ref().map(format_timestamp),
            primary_key: primary_key.to_string(),
            secondary_key: secondary_key.to_string(),
            state_comment: props.state_comment.clone(),
            allow_tracing: props.allow_tracing.unwrap_or(false),
        },
        name,
    })
}

/// Turn a snapshot record back into its wire shape and secrets
pub fn to_remote(record: &CredentialRecord) -> KeyResult<(RemoteSubscription, SubscriptionSecrets)> {
    let props = &record.properties;
    let remote = RemoteSubscription {
        id: Some(record.id.clone()),
        name: Some(record.name.clone()),
        kind: Some(record.kind.clone()),
        properties: Some(RemoteSubscriptionProperties {
            owner_id: props.owner_id.clone(),
            scope: Some(props.scope.clone()),
            display_name: Some(props.display_name.clone()),
            state: props.state.parse()?,
            created_date: parse_optional_timestamp(&props.created_date)?,
            start_date: parse_optional_timestamp(&props.start_date)?,
            end_date: parse_optional_timestamp(&props.end_date)?,
            expiration_date: parse_optional_timestamp(&props.expiration_date)?,
            notification_date: parse_optional_timestamp(&props.notification_date)?,
            state_comment: props.state_comment.clone(),
            allow_tracing: Some(props.allow_tracing),
        }),
    };
    let secrets = SubscriptionSecrets::new(&props.primary_key, &props.secondary_key);
    Ok((remote, secrets))
}

/// Build the create-or-update request that recreates `record` at `scope`
pub fn creation_request(record: &CredentialRecord, scope: String) -> KeyResult<CreateSubscription> {
    let props = &record.properties;
    if props.primary_key.is_empty() || props.secondary_key.is_empty() {
        return Err(KeyError::MissingSecrets(record.name.clone()));
    }

    Ok(CreateSubscription {
        properties: CreateSubscriptionProperties {
            scope,
            display_name: props.display_name.clone(),
            owner_id: props.owner_id.clone().filter(|o| !o.is_empty()),
            primary_key: Some(props.primary_key.clone()),
            secondary_key: Some(props.secondary_key.clone()),
            state: Some(props.state.parse()?),
            allow_tracing: Some(props.allow_tracing),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_remote() -> RemoteSubscription {
        serde_json::from_str(
            r#"{
                "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim/subscriptions/sub-1",
                "name": "sub-1",
                "type": "Microsoft.ApiManagement/service/subscriptions",
                "properties": {
                    "ownerId": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim/users/u1",
                    "scope": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim/products/starter",
                    "displayName": "Starter",
                    "state": "suspended",
                    "createdDate": "2024-01-02T03:04:05.1234567Z",
                    "startDate": "2024-01-03T00:00:00Z",
                    "endDate": "2024-12-31T23:59:59Z",
                    "expirationDate": "2025-01-01T00:00:00Z",
                    "notificationDate": "2024-12-01T08:30:00Z",
                    "stateComment": "paused by ops",
                    "allowTracing": true
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_project_formats_timestamps() {
        let record = project_record(&full_remote(), &SubscriptionSecrets::new("p", "s")).unwrap();
        let props = &record.properties;
        assert_eq!(record.name, "sub-1");
        assert_eq!(props.state, "suspended");
        assert_eq!(props.created_date.as_deref(), Some("2024-01-02T03:04:05Z"));
        assert_eq!(props.notification_date.as_deref(), Some("2024-12-01T08:30:00Z"));
        assert_eq!(props.primary_key, "p");
        assert_eq!(props.secondary_key, "s");
        assert!(props.allow_tracing);
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let record = project_record(&full_remote(), &SubscriptionSecrets::new("p", "s")).unwrap();
        let (remote, secrets) = to_remote(&record).unwrap();
        let again = project_record(&remote, &secrets).unwrap();
        assert_eq!(record, again);
    }

    #[test]
    fn test_missing_secrets_rejected() {
        let secrets = SubscriptionSecrets {
            primary_key: Some("p".to_string()),
            secondary_key: None,
        };
        let err = project_record(&full_remote(), &secrets).unwrap_err();
        assert!(matches!(err, KeyError::MissingSecrets(name) if name == "sub-1"));

        let empty = SubscriptionSecrets::new("", "s");
        assert!(project_record(&full_remote(), &empty).is_err());
    }

    #[test]
    fn test_absent_optionals_stay_absent() {
        let remote: RemoteSubscription = serde_json::from_str(
            r#"{"name": "bare", "properties": {"scope": "/x/service/apim", "displayName": "Bare", "state": "active", "endDate": null}}"#,
        )
        .unwrap();
        let record = project_record(&remote, &SubscriptionSecrets::new("p", "s")).unwrap();
        assert_eq!(record.properties.end_date, None);
        assert_eq!(record.properties.owner_id, None);
        assert!(!record.properties.allow_tracing);
        assert_eq!(record.id, "");
    }

    #[test]
    fn test_creation_request_carries_restorable_fields() {
        let record = project_record(&full_remote(), &SubscriptionSecrets::new("p", "s")).unwrap();
        let request = creation_request(&record, "/target/scope".to_string()).unwrap();
        let props = &request.properties;
        assert_eq!(props.scope, "/target/scope");
        assert_eq!(props.display_name, "Starter");
        assert_eq!(props.state, Some(SubscriptionState::Suspended));
        assert_eq!(props.primary_key.as_deref(), Some("p"));
        assert_eq!(props.secondary_key.as_deref(), Some("s"));
        assert_eq!(props.allow_tracing, Some(true));
        assert!(props.owner_id.as_deref().unwrap().ends_with("/users/u1"));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["properties"]["state"], "suspended");
        assert_eq!(body["properties"]["displayName"], "Starter");
    }

    #[test]
    fn test_unknown_state_is_invalid() {
        let mut record =
            project_record(&full_remote(), &SubscriptionSecrets::new("p", "s")).unwrap();
        record.properties.state = "paused".to_string();
        assert!(matches!(
            creation_request(&record, String::new()),
            Err(KeyError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let ts = parse_timestamp("2024-05-06T07:08:09Z").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-05-06T07:08:09Z");
        let ts = parse_timestamp("2024-05-06T07:08:09+02:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-05-06T05:08:09Z");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
