//! Storage trait abstraction.

use async_trait::async_trait;
use waypoint_core::{Milestone, Project, ProjectId, ProjectSnapshot};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Read access to project data.
///
/// Writes belong to the admin application; Waypoint only ever reads the
/// snapshot it renders.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a project with its milestones (ordered by `order`) and activity.
    async fn load_snapshot(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>>;

    /// List all projects.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List a project's milestones in display order.
    ///
    /// Unknown projects yield `NotFound`.
    async fn list_milestones(&self, id: &ProjectId) -> Result<Vec<Milestone>> {
        self.load_snapshot(id)
            .await?
            .map(|snapshot| snapshot.milestones)
            .ok_or_else(|| StorageError::NotFound(format!("project {}", id)))
    }
}
