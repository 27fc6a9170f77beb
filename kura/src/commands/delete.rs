//! delete command
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
use anyhow::{bail, Context, Result};
use clap::Args;
use kura_config::KuraConfig;
use kura_keys::DeleteOptions;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Only delete subscriptions of this product
    #[arg(short = 'p', long)]
    pub product_id: Option<String>,

    /// Show what would be deleted without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also delete the built-in master subscription
    #[arg(long)]
    pub all: bool,
}

pub async fn run(config: &KuraConfig, args: DeleteArgs) -> Result<()> {
    let options = DeleteOptions {
        product_id: args.product_id.clone().filter(|p| !p.is_empty()),
        dry_run: args.dry_run,
        include_builtin: args.all,
    };
    let store = connect(config, &args.instance).await?;

    let tally = store
        .delete_all(&options)
        .await
        .context("Failed to list subscriptions")?;
    if tally.total() == 0 {
        println!("Nothing to delete");
        return Ok(());
    }

    for outcome in &tally.outcomes {
        println!("{}", outcome_line(outcome, "Deleted", "delete"));
    }

    println!();
    println!(
        "Delete complete: {} deleted, {} skipped, {} failed",
        tally.succeeded(),
        tally.skipped(),
        tally.failed()
    );
    if !tally.is_success() {
        bail!("{} subscriptions failed to delete", tally.failed());
    }
    Ok(())
}
