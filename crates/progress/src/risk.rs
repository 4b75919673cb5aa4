//! Milestone dependency and schedule-risk evaluation.
//!
//! Everything here is a pure function over one project's milestones:
//! - Prerequisite resolution (one level deep, unknown ids ignored)
//! - Blocking-item lists per milestone and per project
//! - Traffic-light schedule risk against an injected `now`
//!
//! Prerequisites are not walked transitively and cycles are not detected;
//! two milestones that list each other each report the other as blocking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;
use waypoint_core::{Milestone, Time};

/// Unmet prerequisites within this many days of the target date are urgent.
pub const URGENT_WINDOW_DAYS: f64 = 2.0;

/// Unmet prerequisites further out than this are not yet pressing.
pub const ATTENTION_WINDOW_DAYS: f64 = 7.0;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Traffic-light schedule risk of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// On track
    Green,
    /// Attention needed
    Yellow,
    /// Urgent
    Red,
}

impl RiskLevel {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Yellow => "yellow",
            RiskLevel::Red => "red",
        }
    }

    /// Customer-facing badge text.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Green => "On Track",
            RiskLevel::Yellow => "Attention Needed",
            RiskLevel::Red => "Urgent",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the prerequisite milestones of `milestone` within `all`.
///
/// Results follow the order of `all`. Ids with no match are dropped, and an
/// undecodable prerequisite field reads as empty.
fn resolve_prerequisites<'a>(milestone: &Milestone, all: &'a [Milestone]) -> Vec<&'a Milestone> {
    let field = &milestone.prerequisite_milestone_ids;
    if field.is_malformed() {
        warn!(
            milestone = %milestone.id,
            "prerequisite list could not be decoded; treating as empty"
        );
    }

    let ids = field.ids();
    if ids.is_empty() {
        return Vec::new();
    }

    all.iter().filter(|m| ids.contains(&m.id)).collect()
}

/// Check whether every known prerequisite of `milestone` is completed.
pub fn prerequisites_satisfied(milestone: &Milestone, all: &[Milestone]) -> bool {
    resolve_prerequisites(milestone, all)
        .iter()
        .all(|m| m.is_completed())
}

/// Names of the prerequisites that are not completed yet.
pub fn blocking_item_names(milestone: &Milestone, all: &[Milestone]) -> Vec<String> {
    resolve_prerequisites(milestone, all)
        .into_iter()
        .filter(|m| !m.is_completed())
        .map(|m| m.name.clone())
        .collect()
}

/// Check if an incomplete milestone is held up by its prerequisites.
pub fn is_milestone_blocked(milestone: &Milestone, all: &[Milestone]) -> bool {
    !milestone.is_completed() && !prerequisites_satisfied(milestone, all)
}

/// Fractional days from `now` until `target`; negative once overdue.
pub fn days_until(target: Time, now: Time) -> f64 {
    (target - now).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Classify the schedule risk of a milestone.
///
/// Completed milestones have no risk. Without a target date only the
/// prerequisites matter. With one, unmet prerequisites turn red inside the
/// urgent window and yellow outside it, while met prerequisites stay green,
/// including when the target date has already passed.
pub fn classify_schedule_risk(
    milestone: &Milestone,
    all: &[Milestone],
    now: Time,
) -> Option<RiskLevel> {
    if milestone.is_completed() {
        return None;
    }

    let satisfied = prerequisites_satisfied(milestone, all);

    let Some(target) = milestone.target_date else {
        return Some(if satisfied { RiskLevel::Green } else { RiskLevel::Yellow });
    };

    let days = days_until(target, now);

    if satisfied && days > 0.0 {
        return Some(RiskLevel::Green);
    }

    if !satisfied {
        if days <= URGENT_WINDOW_DAYS {
            return Some(RiskLevel::Red);
        }
        if days > ATTENTION_WINDOW_DAYS {
            return Some(RiskLevel::Yellow);
        }
        return Some(RiskLevel::Yellow);
    }

    // Satisfied but due now or overdue.
    Some(RiskLevel::Green)
}

/// Everything blocking any incomplete milestone in the project.
///
/// Names are unique and appear in the order first encountered while walking
/// `all` in order.
pub fn aggregate_project_blocking_items(all: &[Milestone]) -> Vec<String> {
    let blocking: Vec<String> = all
        .iter()
        .filter(|m| !m.is_completed())
        .flat_map(|m| blocking_item_names(m, all))
        .collect();

    let mut seen = HashSet::new();
    blocking
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Share of milestones completed, as a whole percentage (halves round up).
pub fn progress_percentage(all: &[Milestone]) -> u8 {
    if all.is_empty() {
        return 0;
    }
    let completed = all.iter().filter(|m| m.is_completed()).count();
    ((completed as f64 / all.len() as f64) * 100.0).round() as u8
}
