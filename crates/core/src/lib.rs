//! Waypoint core data models.
//!
//! This crate defines the project, milestone and activity records that the
//! customer tracking page is built from.

#![warn(missing_docs)]

// Core identities
mod id;

// Project tracking
mod project;
mod milestone;
mod activity;

// Re-exports
pub use id::*;

pub use project::{Project, ProjectStatus, ProjectSnapshot};
pub use milestone::{Milestone, MilestoneStatus, ParseStatusError, PrerequisiteIds};
pub use activity::ActivityLog;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
