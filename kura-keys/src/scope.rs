//! Scope extraction and rebuilding
//!
//! A subscription scope is the full resource path of whatever the key grants
//! access to: the API Management instance itself, one product, or one API.
//! Only the part after `/service/<instance>` survives a move between
//! environments; everything before it names the source deployment.
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


use std::fmt;

/// Resource provider namespace of API Management
pub const PROVIDER: &str = "Microsoft.ApiManagement";

const SERVICE_MARKER: &str = "/service/";
const PRODUCTS_SEGMENT: &str = "products/";

/// Return the environment-independent part of a scope.
///
/// Everything after `/service/<instance>/` (last marker wins), minus one
/// trailing slash. Returns an empty string for instance-level scopes and for
/// scopes without a `/service/` marker.
pub fn extract_suffix(scope: &str) -> String {
    let Some(idx) = scope.rfind(SERVICE_MARKER) else {
        return String::new();
    };

    // "<instance>" or "<instance>/<suffix>"
    let after_marker = &scope[idx + SERVICE_MARKER.len()..];
    let Some(slash) = after_marker.find('/') else {
        return String::new();
    };

    let rest = &after_marker[slash + 1..];
    rest.strip_suffix('/').unwrap_or(rest).to_string()
}

/// Build a full scope for a target instance, appending `suffix` when present
pub fn build_scope(
    subscription_id: &str,
    resource_group: &str,
    service_name: &str,
    suffix: &str,
) -> String {
    let base = format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}/service/{}",
        subscription_id, resource_group, PROVIDER, service_name
    );
    if suffix.is_empty() {
        base
    } else {
        format!("{}/{}", base, suffix)
    }
}

/// Product id of a `products/<id>` suffix
pub fn product_id(suffix: &str) -> Option<&str> {
    let rest = suffix.strip_prefix(PRODUCTS_SEGMENT)?;
    let id = rest.split('/').next().unwrap_or(rest);
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// How restore derives the target scope of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopePolicy {
    /// Rebuild any suffix; an empty suffix restores at instance scope
    #[default]
    Rebuild,
    /// Only restore product-scoped records; others are skipped as failures
    RequireProduct,
}

/// Identifies one API Management instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocator {
    /// Cloud subscription id (not an API Management subscription)
    pub subscription_id: String,
    pub resource_group: String,
    pub service_name: String,
}

impl ServiceLocator {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            service_name: service_name.into(),
        }
    }

    /// Resource path of the instance itself
    pub fn resource_id(&self) -> String {
        self.scope_for("")
    }

    /// Rebuild a scope suffix against this instance
    pub fn scope_for(&self, suffix: &str) -> String {
        build_scope(
            &self.subscription_id,
            &self.resource_group,
            &self.service_name,
            suffix,
        )
    }
}

impl fmt::Display for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.service_name)
    }
}
