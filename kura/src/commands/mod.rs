//! Command implementations
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

pub mod backup;
pub mod clean;
pub mod compare;
pub mod delete;
pub mod list;
pub mod restore;

use anyhow::{Context, Result};
use clap::Args;
use kura_azure::{ApimClient, ApimConfig};
use kura_config::KuraConfig;
use kura_keys::key_store::RecordOutcome;
use kura_keys::{KeyStore, RecordStatus};
use std::sync::Arc;

/// Flags that select the API Management instance
#[derive(Args, Debug, Clone)]
pub struct InstanceArgs {
    /// Resource group of the instance
    #[arg(short = 'g', long)]
    pub resource_group: String,

    /// API Management instance name
    #[arg(short = 'a', long)]
    pub apim_name: String,

    /// Azure subscription id; resolved from the az CLI when omitted
    #[arg(short = 's', long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,
}

/// Resolve identity and build a key store for the selected instance
pub async fn connect(config: &KuraConfig, instance: &InstanceArgs) -> Result<KeyStore> {
    let mut apim = ApimConfig::new(config.arm_endpoint(), config.api_version.clone());
    if let Some(token) = config.access_token() {
        apim = apim.with_access_token(token);
    }

    let client = ApimClient::connect(
        apim,
        instance.subscription.clone(),
        &instance.resource_group,
        &instance.apim_name,
    )
    .await
    .context("Failed to connect to API Management")?;

    Ok(KeyStore::new(Arc::new(client)))
}

/// One report line for a restore or delete outcome
pub fn outcome_line(outcome: &RecordOutcome, done: &str, would: &str) -> String {
    let label = format!("{} ({})", outcome.display_name, outcome.name);
    match &outcome.status {
        RecordStatus::Applied { scope: Some(scope) } => {
            format!("[OK] {}: {} -> {}", done, label, scope)
        }
        RecordStatus::Applied { scope: None } => format!("[OK] {}: {}", done, label),
        RecordStatus::DryRun { scope: Some(scope) } => {
            format!("[DRY-RUN] Would {}: {} -> {}", would, label, scope)
        }
        RecordStatus::DryRun { scope: None } => {
            format!("[DRY-RUN] Would {}: {}", would, label)
        }
        RecordStatus::Skipped { reason } => format!("[SKIP] {} ({})", label, reason),
        RecordStatus::Failed { error } => format!("[FAIL] {}: {}", label, error),
    }
}
