//! clean command
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

use anyhow::{Context, Result};
use clap::Args;
use kura_config::KuraConfig;
use kura_keys::snapshot::clean;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Backup folder to remove; defaults to the configured backup root
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub async fn run(config: &KuraConfig, args: CleanArgs) -> Result<()> {
    let root = args.root.unwrap_or_else(|| config.backup_root.clone());
    let removed = clean(&root)
        .await
        .with_context(|| format!("Failed to remove {}", root.display()))?;

    if removed {
        println!("Backup folder removed successfully.");
    } else {
        println!("No backup folder found. Nothing to clean.");
    }
    Ok(())
}
