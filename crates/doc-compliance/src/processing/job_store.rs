//! File-per-job persistence for agent job records
//!
//! Each record lives at `<dir>/<job_id>.json` and is always rewritten as a
//! full snapshot. Writes land in a hidden temp file first and are renamed into
//! place, so readers see either the previous or the next snapshot.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;
use crate::types::Job;

/// Directory-backed job record store
#[derive(Debug, Clone)]
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    /// Open a store, creating its directory if needed
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Overwrite the record for `job.id` with a full snapshot
    pub async fn put(&self, job: &Job) -> Result<()> {
        let data = serde_json::to_vec_pretty(job)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!(".{}.json.tmp", job.id));
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, self.record_path(job.id)).await?;
        Ok(())
    }

    /// Current record for a job; unreadable records count as missing
    pub async fn get(&self, id: Uuid) -> Result<Option<Job>> {
        let data = match tokio::fs::read(self.record_path(id)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&data) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                tracing::warn!("Ignoring corrupt job record {}: {}", id, e);
                Ok(None)
            }
        }
    }

    /// Every readable record, oldest first
    pub async fn list(&self) -> Result<Vec<Job>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut jobs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }

            let data = match tokio::fs::read(entry.path()).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::debug!("Skipping job record {}: {}", name, e);
                    continue;
                }
            };
            match serde_json::from_slice::<Job>(&data) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::debug!("Skipping corrupt job record {}: {}", name, e),
            }
        }

        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobStatus;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("_jobs")).unwrap();

        let mut job = Job::new("doc-1", "fix grammar");
        store.put(&job).await.unwrap();

        job.transition(JobStatus::Running).unwrap();
        job.push_log("Job started");
        store.put(&job).await.unwrap();

        let loaded = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(loaded, job);

        let raw = std::fs::read_to_string(store.dir().join(format!("{}.json", job.id))).unwrap();
        assert!(raw.contains("\"status\": \"running\""));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_records_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().to_path_buf()).unwrap();

        let job = Job::new("doc-1", "fix grammar");
        store.put(&job).await.unwrap();

        let broken = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{}.json", broken)), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join(format!(".{}.json.tmp", broken)), "{}").unwrap();

        assert!(store.get(broken).await.unwrap().is_none());

        let jobs = store.list().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job.id);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("_jobs")).unwrap();
        std::fs::remove_dir(store.dir()).unwrap();

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().to_path_buf()).unwrap();

        let first = Job::new("doc-1", "a");
        let mut second = Job::new("doc-2", "b");
        second.created_at = first.created_at + chrono::Duration::seconds(1);

        store.put(&second).await.unwrap();
        store.put(&first).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
