//! Kura
//!
//! Backs up, restores, deletes and compares API Management subscription keys.
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

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    backup::BackupArgs, clean::CleanArgs, compare::CompareArgs, delete::DeleteArgs,
    list::ListArgs, restore::RestoreArgs,
};
use kura_config::{KuraConfig, LogFormat};
use kura_logging::{init_console_logging, init_logging};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "kura", version, about = "API Management subscription key backup and restore")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Back up subscriptions and their keys to a snapshot file
    Backup(BackupArgs),
    /// Print subscriptions and their keys
    List(ListArgs),
    /// Recreate subscriptions from a snapshot file
    Restore(RestoreArgs),
    /// Delete subscriptions from an instance
    Delete(DeleteArgs),
    /// Compare two snapshot files
    Compare(CompareArgs),
    /// Remove the backup folder
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = KuraConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    match config.log_format {
        LogFormat::Json => init_logging("kura", config.log_level()),
        LogFormat::Console => init_console_logging("kura", config.log_level()),
    }
    debug!(
        arm_endpoint = config.arm_endpoint(),
        backup_root = %config.backup_root.display(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Backup(args) => commands::backup::run(&config, args).await,
        Command::List(args) => commands::list::run(&config, args).await,
        Command::Restore(args) => commands::restore::run(&config, args).await,
        Command::Delete(args) => commands::delete::run(&config, args).await,
        Command::Compare(args) => commands::compare::run(args).await,
        Command::Clean(args) => commands::clean::run(&config, args).await,
    }
}
