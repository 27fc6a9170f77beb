//! Snapshot comparison
//!
//! Records are joined on their key pair rather than on name or id: the
//! question is whether the same secret material exists on both sides, no
//! matter which environment issued it.
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


use crate::record::{without_builtin, CredentialProperties, CredentialRecord};
use serde::Serialize;

/// One attribute that differs between two matched records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub field: &'static str,
    pub left: String,
    pub right: String,
}

/// Classification of a record from the first snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Matched,
    Mismatched { differences: Vec<FieldDifference> },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub display_name: String,
    pub primary_key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of comparing snapshot A against snapshot B
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Records considered in A (built-in excluded)
    pub left_count: usize,
    /// Records considered in B (built-in excluded)
    pub right_count: usize,
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    pub fn matched(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Matched))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Mismatched { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Missing))
    }

    /// Mismatched plus missing
    pub fn failures(&self) -> usize {
        self.mismatched() + self.missing()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Compare every record of `left` against `right`.
///
/// The built-in `master` record is dropped from both sides first. The first
/// record in `right` with the same primary and secondary key is the match.
pub fn compare_snapshots(left: &[CredentialRecord], right: &[CredentialRecord]) -> ComparisonReport {
    let left = without_builtin(left);
    let right = without_builtin(right);

    let entries = left
        .iter()
        .map(|a| {
            let outcome = match right.iter().find(|b| a.key_pair() == b.key_pair()) {
                None => Outcome::Missing,
                Some(b) if attributes_equal(&a.properties, &b.properties) => Outcome::Matched,
                Some(b) => Outcome::Mismatched {
                    differences: attribute_differences(&a.properties, &b.properties),
                },
            };
            ComparisonEntry {
                name: a.name.clone(),
                display_name: a.properties.display_name.clone(),
                primary_key: a.properties.primary_key.clone(),
                outcome,
            }
        })
        .collect();

    ComparisonReport {
        left_count: left.len(),
        right_count: right.len(),
        entries,
    }
}

/// Equality predicate for matched records; `created_date` is not part of it
pub fn attributes_equal(a: &CredentialProperties, b: &CredentialProperties) -> bool {
    a.display_name == b.display_name
        && a.scope == b.scope
        && a.state == b.state
        && a.owner_id == b.owner_id
        && a.primary_key == b.primary_key
        && a.secondary_key == b.secondary_key
        && a.allow_tracing == b.allow_tracing
        && a.start_date == b.start_date
        && a.end_date == b.end_date
        && a.expiration_date == b.expiration_date
        && a.notification_date == b.notification_date
        && a.state_comment == b.state_comment
}

/// Every differing attribute of a mismatched pair, `created_date` included
pub fn attribute_differences(
    a: &CredentialProperties,
    b: &CredentialProperties,
) -> Vec<FieldDifference> {
    let mut diffs = Vec::new();

    push_diff(&mut diffs, "displayName", &a.display_name, &b.display_name);
    push_diff(&mut diffs, "scope", &a.scope, &b.scope);
    push_diff(&mut diffs, "state", &a.state, &b.state);
    push_opt_diff(&mut diffs, "ownerId", &a.owner_id, &b.owner_id);
    if a.allow_tracing != b.allow_tracing {
        diffs.push(FieldDifference {
            field: "allowTracing",
            left: a.allow_tracing.to_string(),
            right: b.allow_tracing.to_string(),
        });
    }
    push_opt_diff(&mut diffs, "createdDate", &a.created_date, &b.created_date);
    push_opt_diff(&mut diffs, "startDate", &a.start_date, &b.start_date);
    push_opt_diff(&mut diffs, "endDate", &a.end_date, &b.end_date);
    push_opt_diff(&mut diffs, "expirationDate", &a.expiration_date, &b.expiration_date);
    push_opt_diff(&mut diffs, "notificationDate", &a.notification_date, &b.notification_date);
    push_opt_diff(&mut diffs, "stateComment", &a.state_comment, &b.state_comment);

    diffs
}

fn push_diff(diffs: &mut Vec<FieldDifference>, field: &'static str, left: &str, right: &str) {
    if left != right {
        diffs.push(FieldDifference {
            field,
            left: left.to_string(),
            right: right.to_string(),
        });
    }
}

fn push_opt_diff(
    diffs: &mut Vec<FieldDifference>,
    field: &'static str,
    left: &Option<String>,
    right: &Option<String>,
) {
    if left != right {
        diffs.push(FieldDifference {
            field,
            left: left.clone().unwrap_or_default(),
            right: right.clone().unwrap_or_default(),
        });
    }
}
