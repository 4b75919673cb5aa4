//! Milestone model - a trackable unit of project progress.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use crate::id::{MilestoneId, ProjectId};
use crate::Time;

/// A milestone is a step of a project shown on the customer tracking page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Unique identifier
    pub id: MilestoneId,

    /// Owning project
    pub project_id: ProjectId,

    /// Display name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Current status
    pub status: MilestoneStatus,

    /// When the milestone is due
    #[serde(default)]
    pub target_date: Option<Time>,

    /// When the milestone was completed
    #[serde(default)]
    pub completed_date: Option<Time>,

    /// Display order within the project
    #[serde(default)]
    pub order: i32,

    /// Milestones that must complete before this one
    #[serde(default)]
    pub prerequisite_milestone_ids: PrerequisiteIds,

    /// Created at
    #[serde(default)]
    pub created_at: Option<Time>,

    /// Last updated
    #[serde(default)]
    pub updated_at: Option<Time>,
}

impl Milestone {
    /// Create a pending milestone with no dates or prerequisites.
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id: MilestoneId::new(),
            project_id,
            name: name.into(),
            description: None,
            status: MilestoneStatus::Pending,
            target_date: None,
            completed_date: None,
            order: 0,
            prerequisite_milestone_ids: PrerequisiteIds::Empty,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<MilestoneId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the status without touching `completed_date`.
    pub fn with_status(mut self, status: MilestoneStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the target date.
    pub fn with_target_date(mut self, target: Time) -> Self {
        self.target_date = Some(target);
        self
    }

    /// Set the display order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set prerequisite milestone ids.
    pub fn with_prerequisites<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<MilestoneId>,
    {
        let ids: Vec<MilestoneId> = ids.into_iter().map(Into::into).collect();
        self.prerequisite_milestone_ids = if ids.is_empty() {
            PrerequisiteIds::Empty
        } else {
            PrerequisiteIds::Decoded(ids)
        };
        self
    }

    /// Whether the milestone is completed.
    pub fn is_completed(&self) -> bool {
        self.status == MilestoneStatus::Completed
    }

    /// Change status, keeping `completed_date` consistent with it.
    ///
    /// Entering `Completed` stamps `now` unless a completion date is already
    /// recorded; any other status clears it.
    pub fn set_status(&mut self, status: MilestoneStatus, now: Time) {
        if status == MilestoneStatus::Completed {
            if self.completed_date.is_none() {
                self.completed_date = Some(now);
            }
        } else {
            self.completed_date = None;
        }
        self.status = status;
        self.updated_at = Some(now);
    }
}

/// Milestone status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Not yet scheduled
    Pending,
    /// Has a slot on the calendar
    Scheduled,
    /// Work underway
    InProgress,
    /// Waiting on customer review
    InReview,
    /// Done
    Completed,
    /// Stuck on something outside the dependency list
    Blocked,
    /// Review sent it back
    ChangesRequested,
}

impl MilestoneStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [MilestoneStatus; 7] = [
        MilestoneStatus::Pending,
        MilestoneStatus::Scheduled,
        MilestoneStatus::InProgress,
        MilestoneStatus::InReview,
        MilestoneStatus::Completed,
        MilestoneStatus::Blocked,
        MilestoneStatus::ChangesRequested,
    ];

    /// Get string representation (as stored).
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "PENDING",
            MilestoneStatus::Scheduled => "SCHEDULED",
            MilestoneStatus::InProgress => "IN_PROGRESS",
            MilestoneStatus::InReview => "IN_REVIEW",
            MilestoneStatus::Completed => "COMPLETED",
            MilestoneStatus::Blocked => "BLOCKED",
            MilestoneStatus::ChangesRequested => "CHANGES_REQUESTED",
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for MilestoneStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        MilestoneStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Stored prerequisite list.
///
/// The database column is untyped JSON: depending on which code path wrote
/// it, it holds a native array of ids, a JSON-encoded string of that array,
/// or null. Non-string array elements are skipped. Anything else is kept as
/// `Malformed` and reads as no prerequisites.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PrerequisiteIds {
    /// No prerequisites recorded
    #[default]
    Empty,
    /// A decoded list of ids, in stored order
    Decoded(Vec<MilestoneId>),
    /// A value that could not be decoded; kept verbatim
    Malformed(Value),
}

impl PrerequisiteIds {
    /// Classify a raw stored value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => PrerequisiteIds::Empty,
            Value::Array(items) => Self::from_array(items),
            Value::String(encoded) => {
                if encoded.trim().is_empty() {
                    return PrerequisiteIds::Empty;
                }
                match serde_json::from_str::<Value>(&encoded) {
                    Ok(Value::Array(items)) => Self::from_array(items),
                    Ok(Value::Null) => PrerequisiteIds::Empty,
                    _ => PrerequisiteIds::Malformed(Value::String(encoded)),
                }
            }
            other => PrerequisiteIds::Malformed(other),
        }
    }

    /// Decode an array, keeping its string elements in order. Other elements
    /// can never name a milestone and are skipped.
    fn from_array(items: Vec<Value>) -> Self {
        let ids: Vec<MilestoneId> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(MilestoneId::from(id)),
                _ => None,
            })
            .collect();
        if ids.is_empty() {
            PrerequisiteIds::Empty
        } else {
            PrerequisiteIds::Decoded(ids)
        }
    }

    /// The usable ids; empty for `Empty` and `Malformed`.
    pub fn ids(&self) -> &[MilestoneId] {
        match self {
            PrerequisiteIds::Decoded(ids) => ids,
            PrerequisiteIds::Empty | PrerequisiteIds::Malformed(_) => &[],
        }
    }

    /// Whether the stored value failed to decode.
    pub fn is_malformed(&self) -> bool {
        matches!(self, PrerequisiteIds::Malformed(_))
    }
}

impl Serialize for PrerequisiteIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PrerequisiteIds::Empty => serializer.serialize_none(),
            PrerequisiteIds::Decoded(ids) => ids.serialize(serializer),
            PrerequisiteIds::Malformed(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PrerequisiteIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(PrerequisiteIds::from_value(value))
    }
}
