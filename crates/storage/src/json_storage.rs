//! JSON file storage implementation.
//!
//! Reads project snapshots from `projects/<id>.json` under the storage root.
//! Each file holds the same document the public track endpoint returns:
//! `{ "project": .., "milestones": [..], "activityLogs": [..] }`.

use std::path::{Path, PathBuf};
use waypoint_core::{Project, ProjectId, ProjectSnapshot};
use super::{Storage, StorageError, Result};
use tokio::fs;
use tracing::{debug, warn};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the `projects/` directory if
    /// it does not exist yet.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("projects")).await?;
        Ok(Self { root })
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_path(&self, id: &ProjectId) -> Result<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(StorageError::Other(format!("invalid project id: {:?}", raw)));
        }
        Ok(self.root.join("projects").join(format!("{}.json", raw)))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn load_snapshot(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>> {
        let path = self.project_path(id)?;
        let Some(mut snapshot) = read_json::<ProjectSnapshot>(&path).await? else {
            debug!(project = %id, "no snapshot on disk");
            return Ok(None);
        };
        snapshot.sort_milestones();
        debug!(
            project = %id,
            milestones = snapshot.milestones.len(),
            "loaded snapshot"
        );
        Ok(Some(snapshot))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let snapshots: Vec<ProjectSnapshot> = list_dir(&self.root.join("projects")).await?;
        let mut projects: Vec<Project> = snapshots.into_iter().map(|s| s.project).collect();
        // Newest first, like the admin dashboard.
        projects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(projects)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable snapshot"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    async fn write_snapshot(dir: &TempDir, id: &str, body: serde_json::Value) {
        let path = dir.path().join("projects").join(format!("{}.json", id));
        fs::write(path, serde_json::to_vec_pretty(&body).unwrap()).await.unwrap();
    }

    fn project(id: &str, name: &str, created: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "status": "IN_PROGRESS", "createdAt": created})
    }

    #[tokio::test]
    async fn test_new_creates_projects_dir() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        assert!(storage.root().join("projects").is_dir());
        assert!(storage.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_snapshot_sorts_by_order() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        write_snapshot(&dir, "p1", json!({
            "project": project("p1", "Kitchen", "2026-01-01T00:00:00Z"),
            "milestones": [
                {"id": "m3", "projectId": "p1", "name": "Handover", "status": "PENDING", "order": 3},
                {"id": "m1", "projectId": "p1", "name": "Survey", "status": "COMPLETED", "order": 1},
                {"id": "m2", "projectId": "p1", "name": "Fit", "status": "SCHEDULED", "order": 2,
                 "prerequisiteMilestoneIds": "[\"m1\"]"}
            ]
        })).await;

        let snapshot = storage.load_snapshot(&ProjectId::from("p1")).await.unwrap().unwrap();
        let names: Vec<_> = snapshot.milestones.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Survey", "Fit", "Handover"]);
        assert_eq!(snapshot.milestones[1].prerequisite_milestone_ids.ids().len(), 1);

        let milestones = storage.list_milestones(&ProjectId::from("p1")).await.unwrap();
        assert_eq!(milestones.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let id = ProjectId::from("nope");

        assert!(storage.load_snapshot(&id).await.unwrap().is_none());
        assert!(matches!(
            storage.list_milestones(&id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        for raw in ["../etc", "a/b", ""] {
            let result = storage.load_snapshot(&ProjectId::from(raw)).await;
            assert!(matches!(result, Err(StorageError::Other(_))), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_list_projects_newest_first_and_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        write_snapshot(&dir, "old", json!({"project": project("old", "Old", "2025-06-01T00:00:00Z")})).await;
        write_snapshot(&dir, "new", json!({"project": project("new", "New", "2026-02-01T00:00:00Z")})).await;
        fs::write(dir.path().join("projects").join("broken.json"), b"{").await.unwrap();
        fs::write(dir.path().join("projects").join("notes.txt"), b"hi").await.unwrap();

        let projects = storage.list_projects().await.unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
        assert_eq!(
            projects[0].created_at,
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        fs::write(dir.path().join("projects").join("bad.json"), b"{\"project\": 1}").await.unwrap();

        let result = storage.load_snapshot(&ProjectId::from("bad")).await;
        assert!(matches!(result, Err(StorageError::Json(_))));
    }
}
