//! list command
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
use kura_keys::CredentialRecord;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Only list subscriptions of this product
    #[arg(short = 'p', long)]
    pub product_id: Option<String>,
}

pub async fn run(config: &KuraConfig, args: ListArgs) -> Result<()> {
    let store = connect(config, &args.instance).await?;
    let product = args.product_id.as_deref().filter(|p| !p.is_empty());

    let records = store
        .fetch_records(product)
        .await
        .context("Failed to list subscriptions")?;

    if records.is_empty() {
        println!("No subscriptions found.");
        return Ok(());
    }

    println!("Found {} subscriptions:", records.len());
    for record in &records {
        println!();
        for line in render(record) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn render(record: &CredentialRecord) -> Vec<String> {
    let p = &record.properties;
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        format!("Name:              {}", record.name),
        format!("  ID:              {}", record.id),
        format!("  Display Name:    {}", p.display_name),
        format!("  Scope:           {}", p.scope),
        format!("  State:           {}", p.state),
        format!("  Owner ID:        {}", opt(&p.owner_id)),
        format!("  Primary Key:     {}", p.primary_key),
        format!("  Secondary Key:   {}", p.secondary_key),
        format!("  Allow Tracing:   {}", p.allow_tracing),
        format!("  Created:         {}", opt(&p.created_date)),
        format!("  Start:           {}", opt(&p.start_date)),
        format!("  End:             {}", opt(&p.end_date)),
        format!("  Expiration:      {}", opt(&p.expiration_date)),
        format!("  Notification:    {}", opt(&p.notification_date)),
        format!("  State Comment:   {}", opt(&p.state_comment)),
    ]
}
