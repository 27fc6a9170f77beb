//! Subscription key backup and restore for API Management
//!
//! Exports subscription keys to JSON snapshots, recreates them in another
//! environment with their scopes rewritten, and compares snapshots by key
//! material.
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


pub mod compare;
pub mod error;
pub mod key_store;
pub mod projection;
pub mod record;
pub mod scope;
pub mod service;
pub mod snapshot;

pub use compare::{compare_snapshots, ComparisonReport, Outcome};
pub use error::{KeyError, KeyResult};
pub use key_store::{BackupOptions, DeleteOptions, KeyStore, RecordStatus, RestoreOptions, Tally};
pub use record::{CredentialRecord, CredentialProperties, MASTER_SUBSCRIPTION};
pub use scope::{build_scope, extract_suffix, ScopePolicy, ServiceLocator};
pub use service::CredentialService;
