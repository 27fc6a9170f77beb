//! Azure API Management connector
//!
//! Implements `CredentialService` over the Resource Manager REST API, with
//! the Azure CLI as identity and token source.
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


pub mod client;
pub mod error;
pub mod identity;

pub use client::{ApimClient, ApimConfig};
pub use error::{ApimError, ApimResult};
