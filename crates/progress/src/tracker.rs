//! Tracking views and the tracker service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use waypoint_core::{ActivityLog, Milestone, MilestoneId, Project, ProjectId, ProjectSnapshot, Time};
use waypoint_storage::{Result, Storage};

use crate::risk::{
    aggregate_project_blocking_items, blocking_item_names, classify_schedule_risk,
    is_milestone_blocked, progress_percentage, RiskLevel,
};

/// How many activity entries a tracking view carries.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// A milestone with its evaluated risk and blockers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    /// The milestone as stored
    #[serde(flatten)]
    pub milestone: Milestone,

    /// Schedule risk; `None` once completed
    pub risk_level: Option<RiskLevel>,

    /// Held up by incomplete prerequisites
    pub is_blocked: bool,

    /// Names of incomplete prerequisites
    pub blocking_items: Vec<String>,
}

impl MilestoneView {
    /// Evaluate one milestone against its project.
    pub fn evaluate(milestone: &Milestone, all: &[Milestone], now: Time) -> Self {
        Self {
            milestone: milestone.clone(),
            risk_level: classify_schedule_risk(milestone, all, now),
            is_blocked: is_milestone_blocked(milestone, all),
            blocking_items: blocking_item_names(milestone, all),
        }
    }
}

/// Everything the customer tracking page shows for a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackView {
    /// The project
    pub project: Project,

    /// Whole percentage of milestones completed
    pub progress_percentage: u8,

    /// Completed milestone count
    pub completed_milestones: usize,

    /// Total milestone count
    pub total_milestones: usize,

    /// Everything incomplete milestones are waiting on
    pub waiting_on: Vec<String>,

    /// Evaluated milestones, in display order
    pub milestones: Vec<MilestoneView>,

    /// Newest activity first
    pub recent_activity: Vec<ActivityLog>,

    /// The instant every risk level was computed against
    pub evaluated_at: Time,
}

impl TrackView {
    /// Build a view from a snapshot. `now` is shared by every milestone.
    pub fn build(snapshot: &ProjectSnapshot, now: Time) -> Self {
        let all = &snapshot.milestones;

        let milestones: Vec<MilestoneView> = all
            .iter()
            .map(|m| MilestoneView::evaluate(m, all, now))
            .collect();

        let mut recent_activity = snapshot.activity_logs.clone();
        recent_activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

        Self {
            project: snapshot.project.clone(),
            progress_percentage: progress_percentage(all),
            completed_milestones: all.iter().filter(|m| m.is_completed()).count(),
            total_milestones: all.len(),
            waiting_on: aggregate_project_blocking_items(all),
            milestones,
            recent_activity,
            evaluated_at: now,
        }
    }

    /// Count milestones at the given risk level.
    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.risk_level == Some(level))
            .count()
    }
}

/// Project tracking service.
#[async_trait]
pub trait ProjectTracker: Send + Sync {
    /// Build the tracking view of a project.
    async fn track(&self, project_id: &ProjectId, now: Time) -> Result<Option<TrackView>>;

    /// Evaluate a single milestone of a project.
    async fn milestone_risk(
        &self,
        project_id: &ProjectId,
        milestone_id: &MilestoneId,
        now: Time,
    ) -> Result<Option<MilestoneView>>;

    /// Everything a project is waiting on.
    async fn waiting_on(&self, project_id: &ProjectId) -> Result<Option<Vec<String>>>;
}

/// Basic project tracker implementation.
pub struct BasicProjectTracker<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BasicProjectTracker<S> {
    /// Create a new project tracker.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Create a tracker over shared storage.
    pub fn with_shared(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage + 'static> ProjectTracker for BasicProjectTracker<S> {
    async fn track(&self, project_id: &ProjectId, now: Time) -> Result<Option<TrackView>> {
        let Some(snapshot) = self.storage.load_snapshot(project_id).await? else {
            return Ok(None);
        };

        let view = TrackView::build(&snapshot, now);
        info!(
            project = %project_id,
            progress = view.progress_percentage,
            red = view.count_at(RiskLevel::Red),
            waiting_on = view.waiting_on.len(),
            "built tracking view"
        );
        Ok(Some(view))
    }

    async fn milestone_risk(
        &self,
        project_id: &ProjectId,
        milestone_id: &MilestoneId,
        now: Time,
    ) -> Result<Option<MilestoneView>> {
        let Some(snapshot) = self.storage.load_snapshot(project_id).await? else {
            return Ok(None);
        };

        let all = &snapshot.milestones;
        let view = all
            .iter()
            .find(|m| &m.id == milestone_id)
            .map(|m| MilestoneView::evaluate(m, all, now));
        debug!(project = %project_id, milestone = %milestone_id, found = view.is_some(), "evaluated milestone");
        Ok(view)
    }

    async fn waiting_on(&self, project_id: &ProjectId) -> Result<Option<Vec<String>>> {
        let snapshot = self.storage.load_snapshot(project_id).await?;
        Ok(snapshot.map(|s| aggregate_project_blocking_items(&s.milestones)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use waypoint_core::MilestoneStatus;

    struct MockStorage {
        snapshots: HashMap<ProjectId, ProjectSnapshot>,
    }

    #[async_trait]
    impl Storage for MockStorage {
        async fn load_snapshot(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>> {
            Ok(self.snapshots.get(id).cloned())
        }
        async fn list_projects(&self) -> Result<Vec<Project>> {
            Ok(self.snapshots.values().map(|s| s.project.clone()).collect())
        }
    }

    fn now() -> Time {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn snapshot() -> ProjectSnapshot {
        let mut project = Project::new("Roof replacement");
        project.id = ProjectId::from("p1");
        let pid = project.id.clone();

        let mut s = ProjectSnapshot::new(project);
        s.milestones = vec![
            Milestone::new(pid.clone(), "Inspection")
                .with_id("m1")
                .with_status(MilestoneStatus::Completed),
            Milestone::new(pid.clone(), "Materials")
                .with_id("m2")
                .with_status(MilestoneStatus::InProgress)
                .with_target_date(now() + Duration::days(1)),
            Milestone::new(pid.clone(), "Tear-off")
                .with_id("m3")
                .with_status(MilestoneStatus::Scheduled)
                .with_prerequisites(["m1", "m2"])
                .with_target_date(now() + Duration::hours(36)),
            Milestone::new(pid.clone(), "Final walkthrough")
                .with_id("m4")
                .with_prerequisites(["m3"]),
        ];
        s.activity_logs = (0..12)
            .map(|i| {
                ActivityLog::new(pid.clone(), "milestone_updated", format!("update {}", i), now() - Duration::hours(i))
            })
            .rev()
            .collect();
        s
    }

    fn tracker() -> BasicProjectTracker<MockStorage> {
        let s = snapshot();
        let mut snapshots = HashMap::new();
        snapshots.insert(s.project.id.clone(), s);
        BasicProjectTracker::new(MockStorage { snapshots })
    }

    #[test]
    fn test_build_view() {
        let view = TrackView::build(&snapshot(), now());

        assert_eq!(view.total_milestones, 4);
        assert_eq!(view.completed_milestones, 1);
        assert_eq!(view.progress_percentage, 25);
        assert_eq!(view.waiting_on, vec!["Materials", "Tear-off"]);
        assert_eq!(view.evaluated_at, now());

        let risks: Vec<_> = view.milestones.iter().map(|m| m.risk_level).collect();
        assert_eq!(
            risks,
            vec![None, Some(RiskLevel::Green), Some(RiskLevel::Red), Some(RiskLevel::Yellow)]
        );
        assert_eq!(view.milestones[2].blocking_items, vec!["Materials"]);
        assert!(view.milestones[2].is_blocked);
        assert!(!view.milestones[0].is_blocked);
        assert_eq!(view.count_at(RiskLevel::Red), 1);
    }

    #[test]
    fn test_recent_activity_newest_first_and_capped() {
        let view = TrackView::build(&snapshot(), now());
        assert_eq!(view.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(view.recent_activity[0].message, "update 0");
        assert_eq!(view.recent_activity[9].message, "update 9");
    }

    #[test]
    fn test_view_json_shape() {
        let view = TrackView::build(&snapshot(), now());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["progressPercentage"], 25);
        assert_eq!(json["waitingOn"][0], "Materials");
        let tear_off = &json["milestones"][2];
        assert_eq!(tear_off["name"], "Tear-off");
        assert_eq!(tear_off["riskLevel"], "red");
        assert_eq!(tear_off["isBlocked"], true);
        assert_eq!(tear_off["prerequisiteMilestoneIds"][1], "m2");
        assert!(json["milestones"][0]["riskLevel"].is_null());
    }

    #[tokio::test]
    async fn test_track_known_and_unknown_project() {
        let tracker = tracker();

        let view = tracker.track(&ProjectId::from("p1"), now()).await.unwrap();
        assert_eq!(view.unwrap().progress_percentage, 25);

        assert!(tracker.track(&ProjectId::from("p9"), now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_milestone_risk() {
        let tracker = tracker();
        let pid = ProjectId::from("p1");

        let view = tracker
            .milestone_risk(&pid, &MilestoneId::from("m4"), now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.risk_level, Some(RiskLevel::Yellow));
        assert_eq!(view.blocking_items, vec!["Tear-off"]);

        let missing = tracker
            .milestone_risk(&pid, &MilestoneId::from("nope"), now())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_waiting_on() {
        let tracker = tracker();
        let waiting = tracker.waiting_on(&ProjectId::from("p1")).await.unwrap();
        assert_eq!(waiting, Some(vec!["Materials".to_string(), "Tear-off".to_string()]));
        assert!(tracker.waiting_on(&ProjectId::from("p9")).await.unwrap().is_none());
    }
}
