//! Identifier types for the bridge domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a container known to the local runtime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container identifier from the runtime's identifier string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first twelve characters, the runtime's log convention.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Back-reference from a derived service to its source container.
///
/// The container name is stored without the leading slash the runtime
/// reports, matching the form embedded in service identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Identifier of the source container.
    pub id: ContainerId,
    /// Container name with any leading slash stripped.
    pub name: String,
}

impl ContainerRef {
    /// Creates a back-reference, stripping the runtime's leading slash from
    /// the container name.
    #[must_use]
    pub fn new(id: ContainerId, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.strip_prefix('/').unwrap_or(&name).to_string();
        Self { id, name }
    }
}
