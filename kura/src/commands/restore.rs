//! restore command
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

use super::{connect, outcome_line, InstanceArgs};
use anyhow::{bail, Result};
use clap::Args;
use kura_config::KuraConfig;
use kura_keys::snapshot::read_snapshot;
use kura_keys::{RestoreOptions, ScopePolicy};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Snapshot file to restore from
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Show what would be restored without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also restore the built-in master subscription
    #[arg(long)]
    pub all: bool,

    /// Fail records whose scope is not a product
    #[arg(long)]
    pub require_product: bool,
}

impl RestoreArgs {
    pub fn options(&self) -> RestoreOptions {
        RestoreOptions {
            dry_run: self.dry_run,
            include_builtin: self.all,
            scope_policy: if self.require_product {
                ScopePolicy::RequireProduct
            } else {
                ScopePolicy::Rebuild
            },
        }
    }
}

pub async fn run(config: &KuraConfig, args: RestoreArgs) -> Result<()> {
    let options = args.options();
    // Read first so a bad file fails before any identity lookup
    let records = read_snapshot(&args.input).await?;
    if records.is_empty() {
        println!("Nothing to restore");
        return Ok(());
    }

    let store = connect(config, &args.instance).await?;
    if options.dry_run {
        println!("Dry run: no changes will be made to {}", store.locator());
    }

    let tally = store.restore(&records, &options).await;
    for outcome in &tally.outcomes {
        println!("{}", outcome_line(outcome, "Restored", "restore"));
    }

    println!();
    println!("Restore complete: {}", tally);
    if !tally.is_success() {
        bail!("{} subscriptions failed to restore", tally.failed());
    }
    Ok(())
}
