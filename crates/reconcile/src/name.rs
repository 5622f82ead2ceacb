//! Resource naming rules
//!
//! Product and project names become pod, service, container, image and
//! namespace names. Underscores and slashes are not accepted by all of
//! those, so both are rewritten to hyphens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rewrite underscores and slashes to hyphens.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    name.replace(['_', '/'], "-")
}

/// A normalized resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    /// Normalize `raw` into a resource name.
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// The normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ResourceName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&ResourceName> for ResourceName {
    fn from(name: &ResourceName) -> Self {
        name.clone()
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.0
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
