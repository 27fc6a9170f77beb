//! High-level subscription key store
//!
//! Runs backup, restore and delete against a `CredentialService`. Records are
//! handled one at a time in listing order. Listing failures abort the whole
//! operation; failures on a single record during restore or delete are
//! counted and the loop moves on.
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
use crate::projection::{creation_request, project_record, CreateSubscription};
use crate::record::{CredentialRecord, MASTER_SUBSCRIPTION};
use crate::scope::{extract_suffix, product_id, ScopePolicy, ServiceLocator};
use crate::service::CredentialService;
use crate::snapshot::write_snapshot;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Options for `KeyStore::backup`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOptions {
    /// Only back up subscriptions of this product
    pub product_id: Option<String>,
    /// Destination snapshot file
    pub output: PathBuf,
}

/// Options for `KeyStore::restore`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    pub dry_run: bool,
    /// Also restore the built-in `master` subscription
    pub include_builtin: bool,
    pub scope_policy: ScopePolicy,
}

/// Options for `KeyStore::delete_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub product_id: Option<String>,
    pub dry_run: bool,
    /// Also delete the built-in `master` subscription
    pub include_builtin: bool,
}

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// The remote change was applied; `scope` is the target scope, if any
    Applied { scope: Option<String> },
    /// Dry run: the change would have been applied
    DryRun { scope: Option<String> },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub name: String,
    pub display_name: String,
    pub status: RecordStatus,
}

/// Per-record outcomes of a restore or delete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub outcomes: Vec<RecordOutcome>,
}

impl Tally {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    RecordStatus::Applied { .. } | RecordStatus::DryRun { .. }
                )
            })
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::Failed { .. }))
            .count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn push(&mut self, name: &str, display_name: &str, status: RecordStatus) {
        self.outcomes.push(RecordOutcome {
            name: name.to_string(),
            display_name: display_name.to_string(),
            status,
        });
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} skipped, {} failed (out of {} total)",
            self.succeeded(),
            self.skipped(),
            self.failed(),
            self.total()
        )
    }
}

/// Key store bound to one API Management instance
pub struct KeyStore {
    backend: Arc<dyn CredentialService>,
}

impl KeyStore {
    /// Create a new key store with a credential service backend
    pub fn new(backend: Arc<dyn CredentialService>) -> Self {
        Self { backend }
    }

    /// Instance the backend talks to
    pub fn locator(&self) -> &ServiceLocator {
        self.backend.locator()
    }

    /// List subscriptions and attach their secrets.
    ///
    /// Stops at the first listing or secrets error: a partial listing is not
    /// a usable snapshot.
    pub async fn fetch_records(&self, product_id: Option<&str>) -> KeyResult<Vec<CredentialRecord>> {
        let listed = self.backend.list_subscriptions(product_id).await?;
        debug!(count = listed.len(), "Listed subscriptions");

        let mut records = Vec::with_capacity(listed.len());
        for remote in &listed {
            let Some(name) = remote.name.as_deref() else {
                warn!(id = ?remote.id, "Skipping subscription without a name");
                continue;
            };
            if remote.properties.is_none() {
                warn!(subscription = name, "Skipping subscription without properties");
                continue;
            }

            let secrets = self.backend.list_secrets(name).await?;
            records.push(project_record(remote, &secrets)?);
        }

        Ok(records)
    }

    /// Fetch all records and write them to `options.output`
    pub async fn backup(&self, options: &BackupOptions) -> KeyResult<Vec<CredentialRecord>> {
        info!(
            instance = %self.locator(),
            product = ?options.product_id,
            output = %options.output.display(),
            "Starting backup"
        );

        let records = self.fetch_records(options.product_id.as_deref()).await?;
        write_snapshot(&options.output, &records).await?;
        Ok(records)
    }

    /// Recreate snapshot records on this instance under their original names
    pub async fn restore(&self, records: &[CredentialRecord], options: &RestoreOptions) -> Tally {
        let mut tally = Tally::default();
        let target = self.locator();

        for record in records {
            let name = record.name.as_str();
            let display_name = record.display_name();

            if record.is_builtin() && !options.include_builtin {
                info!(subscription = name, "Skipping built-in subscription");
                tally.push(name, display_name, RecordStatus::Skipped {
                    reason: "built-in".to_string(),
                });
                continue;
            }

            let suffix = extract_suffix(&record.properties.scope);
            if options.scope_policy == ScopePolicy::RequireProduct && product_id(&suffix).is_none() {
                warn!(subscription = name, scope = %record.properties.scope, "No product id in scope");
                tally.push(name, display_name, RecordStatus::Failed {
                    error: "could not extract product ID from scope".to_string(),
                });
                continue;
            }

            let scope = target.scope_for(&suffix);
            let request = match creation_request(record, scope.clone()) {
                Ok(request) => request,
                Err(e) => {
                    warn!(subscription = name, error = %e, "Invalid snapshot record");
                    tally.push(name, display_name, RecordStatus::Failed {
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if options.dry_run {
                tally.push(name, display_name, RecordStatus::DryRun { scope: Some(scope) });
                continue;
            }

            info!(subscription = name, scope = %scope, "Restoring subscription");
            match self.restore_one(name, &request).await {
                Ok(()) => tally.push(name, display_name, RecordStatus::Applied { scope: Some(scope) }),
                Err(e) => {
                    error!(subscription = name, error = %e, "Restore failed");
                    tally.push(name, display_name, RecordStatus::Failed {
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(summary = %tally, "Restore finished");
        tally
    }

    /// Create the subscription, then confirm the remote holds the same keys
    async fn restore_one(&self, name: &str, request: &CreateSubscription) -> KeyResult<()> {
        self.backend.create_or_update(name, request).await?;

        let secrets = self.backend.list_secrets(name).await?;
        let (primary, secondary) = secrets.require(name)?;
        let props = &request.properties;
        if props.primary_key.as_deref() != Some(primary)
            || props.secondary_key.as_deref() != Some(secondary)
        {
            return Err(KeyError::Remote(format!(
                "keys of subscription {} differ after restore",
                name
            )));
        }
        Ok(())
    }

    /// Delete every listed subscription, built-in excluded unless requested
    pub async fn delete_all(&self, options: &DeleteOptions) -> KeyResult<Tally> {
        let listed = self
            .backend
            .list_subscriptions(options.product_id.as_deref())
            .await?;

        let mut tally = Tally::default();
        for remote in &listed {
            let display_name = remote
                .properties
                .as_ref()
                .and_then(|p| p.display_name.as_deref())
                .unwrap_or_default();
            let Some(name) = remote.name.as_deref() else {
                tally.push("", display_name, RecordStatus::Failed {
                    error: "subscription without a name".to_string(),
                });
                continue;
            };

            if name == MASTER_SUBSCRIPTION && !options.include_builtin {
                tally.push(name, display_name, RecordStatus::Skipped {
                    reason: "built-in".to_string(),
                });
                continue;
            }

            if options.dry_run {
                tally.push(name, display_name, RecordStatus::DryRun { scope: None });
                continue;
            }

            info!(subscription = name, "Deleting subscription");
            match self.backend.delete(name).await {
                Ok(()) => tally.push(name, display_name, RecordStatus::Applied { scope: None }),
                Err(e) => {
                    error!(subscription = name, error = %e, "Delete failed");
                    tally.push(name, display_name, RecordStatus::Failed {
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(summary = %tally, "Delete finished");
        Ok(tally)
    }
}
