//! compare command
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

use anyhow::{bail, Result};
use clap::Args;
use kura_keys::compare::ComparisonEntry;
use kura_keys::snapshot::read_snapshot;
use kura_keys::{compare_snapshots, ComparisonReport, Outcome};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Snapshot A and snapshot B
    #[arg(num_args = 0..=2, conflicts_with_all = ["first", "second"])]
    pub files: Vec<PathBuf>,

    /// Snapshot A
    #[arg(short = 'a', long = "file-a", requires = "second")]
    pub first: Option<PathBuf>,

    /// Snapshot B
    #[arg(short = 'b', long = "file-b", requires = "first")]
    pub second: Option<PathBuf>,
}

impl CompareArgs {
    /// The two snapshot paths, positional arguments first
    pub fn inputs(&self) -> Result<(PathBuf, PathBuf)> {
        match self.files.as_slice() {
            [a, b] => Ok((a.clone(), b.clone())),
            [] => match (&self.first, &self.second) {
                (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
                _ => bail!("two snapshot files are required"),
            },
            other => bail!("expected 2 files, got {}", other.len()),
        }
    }
}

pub async fn run(args: CompareArgs) -> Result<()> {
    let (path_a, path_b) = args.inputs()?;
    let left = read_snapshot(&path_a).await?;
    let right = read_snapshot(&path_b).await?;

    println!("Comparing {} against {}", path_a.display(), path_b.display());
    let report = compare_snapshots(&left, &right);
    for line in render(&report) {
        println!("{}", line);
    }

    if !report.is_success() {
        bail!(
            "{} subscriptions mismatched, {} missing",
            report.mismatched(),
            report.missing()
        );
    }
    Ok(())
}

fn label(entry: &ComparisonEntry) -> String {
    format!("{} ({})", entry.display_name, entry.name)
}

pub fn render(report: &ComparisonReport) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &report.entries {
        match &entry.outcome {
            Outcome::Matched => lines.push(format!("[OK] {}", label(entry))),
            Outcome::Mismatched { differences } => {
                lines.push(format!("[DIFF] {}", label(entry)));
                for d in differences {
                    lines.push(format!("    {}: {:?} != {:?}", d.field, d.left, d.right));
                }
            }
            Outcome::Missing => lines.push(format!(
                "[MISS] {} (primaryKey={})",
                label(entry),
                entry.primary_key
            )),
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Comparison complete: {} matched, {} mismatched, {} missing (out of {} total)",
        report.matched(),
        report.mismatched(),
        report.missing(),
        report.left_count
    ));
    lines
}
