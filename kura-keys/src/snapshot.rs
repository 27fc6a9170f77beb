//! Snapshot file persistence
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
use crate::record::CredentialRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default root directory for backups
pub const DEFAULT_BACKUP_ROOT: &str = "backup";

/// File name used inside the default backup layout
pub const SNAPSHOT_FILE_NAME: &str = "subscriptions.json";

/// `<root>/<resource-group>/<service>[/<product>]`
pub fn backup_dir(
    root: &Path,
    resource_group: &str,
    service_name: &str,
    product_id: Option<&str>,
) -> PathBuf {
    let mut dir = root.join(resource_group).join(service_name);
    if let Some(product) = product_id.filter(|p| !p.is_empty()) {
        dir = dir.join(product);
    }
    dir
}

/// `<backup_dir>/subscriptions.json`
pub fn default_snapshot_path(
    root: &Path,
    resource_group: &str,
    service_name: &str,
    product_id: Option<&str>,
) -> PathBuf {
    backup_dir(root, resource_group, service_name, product_id).join(SNAPSHOT_FILE_NAME)
}

/// Write a snapshot as pretty-printed JSON.
///
/// The records are serialized before anything touches the disk, and the file
/// is written next to its destination and renamed into place, so a failed
/// write leaves either the previous file or nothing.
pub async fn write_snapshot(path: &Path, records: &[CredentialRecord]) -> KeyResult<()> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = staging_path(path)?;
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!(path = %path.display(), records = records.len(), "Snapshot written");
    Ok(())
}

/// Read and parse a snapshot file.
///
/// A file holding `null` is an empty snapshot.
pub async fn read_snapshot(path: &Path) -> KeyResult<Vec<CredentialRecord>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| KeyError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?;

    let records = serde_json::from_str::<Option<Vec<CredentialRecord>>>(&content)
        .map_err(|source| KeyError::SnapshotParse {
            path: path.to_path_buf(),
            source,
        })?
        .unwrap_or_default();

    debug!(path = %path.display(), records = records.len(), "Snapshot loaded");
    Ok(records)
}

/// Remove the backup root and everything below it.
///
/// Returns `false` when there was nothing to remove.
pub async fn clean(root: &Path) -> KeyResult<bool> {
    match fs::metadata(root).await {
        Ok(_) => {
            fs::remove_dir_all(root).await?;
            info!(path = %root.display(), "Backup folder removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn staging_path(path: &Path) -> KeyResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        KeyError::Configuration(format!("Snapshot path has no file name: {}", path.display()))
    })?;
    let mut staged = file_name.to_os_string();
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}
