//! Project model - the customer-facing container of milestones.

use serde::{Deserialize, Serialize};
use crate::id::ProjectId;
use crate::activity::ActivityLog;
use crate::milestone::Milestone;
use crate::Time;

/// A project tracked for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Customer contact
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Project status
    pub status: ProjectStatus,

    /// When work started
    #[serde(default)]
    pub start_date: Option<Time>,

    /// When work ended
    #[serde(default)]
    pub end_date: Option<Time>,

    /// Date promised to the customer
    #[serde(default)]
    pub expected_completion_date: Option<Time>,

    /// Linked CRM deal
    #[serde(default)]
    pub hubspot_deal_id: Option<String>,

    /// Linked CRM contact
    #[serde(default)]
    pub hubspot_contact_id: Option<String>,

    /// Created at
    #[serde(default)]
    pub created_at: Option<Time>,

    /// Last updated
    #[serde(default)]
    pub updated_at: Option<Time>,
}

impl Project {
    /// Create a project that has not started yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: None,
            customer_email: None,
            status: ProjectStatus::NotStarted,
            start_date: None,
            end_date: None,
            expected_completion_date: None,
            hubspot_deal_id: None,
            hubspot_contact_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Signed but not started
    NotStarted,
    /// Work underway
    InProgress,
    /// Paused
    OnHold,
    /// Delivered
    Completed,
    /// Called off
    Cancelled,
}

impl ProjectStatus {
    /// Get string representation (as stored).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "NOT_STARTED",
            ProjectStatus::InProgress => "IN_PROGRESS",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project together with its milestones and activity, as read for one
/// render of the tracking page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    /// The project
    pub project: Project,

    /// Milestones, in display order
    #[serde(default)]
    pub milestones: Vec<Milestone>,

    /// Activity entries
    #[serde(default)]
    pub activity_logs: Vec<ActivityLog>,
}

impl ProjectSnapshot {
    /// Snapshot with no milestones or activity.
    pub fn new(project: Project) -> Self {
        Self {
            project,
            milestones: Vec::new(),
            activity_logs: Vec::new(),
        }
    }

    /// Sort milestones by their display order; ties keep stored order.
    pub fn sort_milestones(&mut self) {
        self.milestones.sort_by_key(|m| m.order);
    }
}
