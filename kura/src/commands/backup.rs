//! backup command
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

use super::{connect, InstanceArgs};
use anyhow::{Context, Result};
use clap::Args;
use kura_config::KuraConfig;
use kura_keys::snapshot::default_snapshot_path;
use kura_keys::BackupOptions;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BackupArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Only back up subscriptions of this product
    #[arg(short = 'p', long)]
    pub product_id: Option<String>,

    /// Snapshot file; defaults to <backup_root>/<group>/<instance>[/<product>]/subscriptions.json
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl BackupArgs {
    pub fn options(&self, config: &KuraConfig) -> BackupOptions {
        let product_id = self.product_id.clone().filter(|p| !p.is_empty());
        let output = self.output.clone().unwrap_or_else(|| {
            default_snapshot_path(
                &config.backup_root,
                &self.instance.resource_group,
                &self.instance.apim_name,
                product_id.as_deref(),
            )
        });
        BackupOptions { product_id, output }
    }
}

pub async fn run(config: &KuraConfig, args: BackupArgs) -> Result<()> {
    let options = args.options(config);
    let store = connect(config, &args.instance).await?;

    let records = store.backup(&options).await.context("Backup failed")?;
    if records.is_empty() {
        println!("No subscriptions found.");
    }
    println!(
        "Backed up {} subscriptions to {}",
        records.len(),
        options.output.display()
    );
    Ok(())
}
