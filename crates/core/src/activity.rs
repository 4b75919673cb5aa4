//! Activity log - the project timeline shown to customers.

use serde::{Deserialize, Serialize};
use crate::id::{ActivityLogId, ProjectId};
use crate::Time;

/// Something that happened on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    /// Unique identifier
    pub id: ActivityLogId,

    /// Owning project
    pub project_id: ProjectId,

    /// Event kind, e.g. `milestone_updated`
    #[serde(rename = "type")]
    pub kind: String,

    /// Human readable message
    pub message: String,

    /// Opaque JSON-encoded metadata
    #[serde(default)]
    pub metadata: Option<String>,

    /// When it happened
    pub created_at: Time,
}

impl ActivityLog {
    /// Create an activity entry.
    pub fn new(
        project_id: ProjectId,
        kind: impl Into<String>,
        message: impl Into<String>,
        created_at: Time,
    ) -> Self {
        Self {
            id: ActivityLogId::new(),
            project_id,
            kind: kind.into(),
            message: message.into(),
            metadata: None,
            created_at,
        }
    }
}
