//! Progress tracking
//!
//! Milestone dependency checks, schedule risk, and project tracking views.

#![warn(missing_docs)]

pub mod risk;
pub mod tracker;

pub use risk::{
    aggregate_project_blocking_items, blocking_item_names, classify_schedule_risk,
    days_until, is_milestone_blocked, prerequisites_satisfied, progress_percentage, RiskLevel,
    ATTENTION_WINDOW_DAYS, URGENT_WINDOW_DAYS,
};
pub use tracker::{BasicProjectTracker, MilestoneView, ProjectTracker, TrackView, RECENT_ACTIVITY_LIMIT};
