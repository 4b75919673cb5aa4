//! Unique identifiers for Waypoint entities.
//!
//! Ids arriving from the tracker's database are opaque strings (not
//! necessarily ULIDs), so each identifier wraps a `String`. Fresh ids are
//! minted as ULIDs.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a Milestone
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneId(String);

impl MilestoneId {
    /// Generate a new MilestoneId
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MilestoneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MilestoneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MilestoneId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for MilestoneId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Unique identifier for a Project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Generate a new ProjectId
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for an ActivityLog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLogId(String);

impl ActivityLogId {
    /// Generate a new ActivityLogId
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }
}

impl Default for ActivityLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique_ulids() {
        let a = MilestoneId::new();
        let b = MilestoneId::new();
        assert_ne!(a, b);
        assert!(a.as_str().parse::<Ulid>().is_ok());
    }

    #[test]
    fn test_external_ids_kept_verbatim() {
        let id = MilestoneId::from("clx9a2b3c0000");
        assert_eq!(id.to_string(), "clx9a2b3c0000");
        assert!(id == *"clx9a2b3c0000");

        let json = serde_json::to_string(&ProjectId::from("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }
}
