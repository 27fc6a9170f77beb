//! Error types for the API Management client
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


use kura_keys::KeyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApimError {
    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Azure CLI error: {0}")]
    Cli(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ApimResult<T> = Result<T, ApimError>;

impl From<ApimError> for KeyError {
    fn from(err: ApimError) -> Self {
        match err {
            ApimError::Authentication(_) | ApimError::Cli(_) => {
                KeyError::Authentication(err.to_string())
            }
            ApimError::NotFound(what) => KeyError::NotFound(what),
            ApimError::Configuration(msg) => KeyError::Configuration(msg),
            other => KeyError::Remote(other.to_string()),
        }
    }
}
