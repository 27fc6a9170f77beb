//! Identity resolution through the Azure CLI
//!
//! The CLI is the only credential source: it supplies the active cloud
//! subscription id when none is given, and bearer tokens for Resource
//! Manager calls.
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
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

const AZ: &str = "az";

#[derive(Deserialize)]
struct Account {
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessToken {
    access_token: String,
}

/// Active subscription id of the Azure CLI.
///
/// Tries `az account show --query id -o tsv` first and falls back to parsing
/// the JSON output of `az account show`.
pub async fn resolve_subscription_id() -> ApimResult<String> {
    match run_az(&["account", "show", "--query", "id", "-o", "tsv"]).await {
        Ok(out) => parse_subscription_tsv(&String::from_utf8_lossy(&out)),
        Err(first) => {
            debug!(error = %first, "tsv lookup failed, retrying with json output");
            let out = run_az(&["account", "show", "-o", "json"])
                .await
                .map_err(|_| ApimError::Cli(format!("failed to run 'az account show': {}", first)))?;
            parse_account_json(&out)
        }
    }
}

/// Bearer token for `resource` from `az account get-access-token`
pub async fn cli_access_token(resource: &str) -> ApimResult<String> {
    let out = run_az(&["account", "get-access-token", "--resource", resource, "-o", "json"]).await?;
    parse_access_token(&out)
}

async fn run_az(args: &[&str]) -> ApimResult<Vec<u8>> {
    let output = Command::new(AZ)
        .args(args)
        .output()
        .await
        .map_err(|e| ApimError::Cli(format!("failed to start '{}': {}", AZ, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ApimError::Cli(format!(
            "'{} {}' exited with {}: {}",
            AZ,
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

fn parse_subscription_tsv(out: &str) -> ApimResult<String> {
    let id = out.trim();
    if id.is_empty() {
        return Err(ApimError::Cli(
            "empty subscription ID from 'az account show'".to_string(),
        ));
    }
    Ok(id.to_string())
}

fn parse_account_json(out: &[u8]) -> ApimResult<String> {
    let account: Account = serde_json::from_slice(out).map_err(|e| {
        ApimError::Cli(format!("failed to parse 'az account show' output: {}", e))
    })?;
    if account.id.is_empty() {
        return Err(ApimError::Cli(
            "no subscription ID found in 'az account show' output".to_string(),
        ));
    }
    Ok(account.id)
}

fn parse_access_token(out: &[u8]) -> ApimResult<String> {
    let token: AccessToken = serde_json::from_slice(out)
        .map_err(|e| ApimError::Authentication(format!("unreadable token response: {}", e)))?;
    if token.access_token.is_empty() {
        return Err(ApimError::Authentication("Azure CLI returned an empty token".to_string()));
    }
    Ok(token.access_token)
}
