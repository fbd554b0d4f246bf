use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use tokio::fs;
use uuid::Uuid;

use crate::store::EntryStore;
use crate::time_entry::{NewTimeEntry, TimeEntry};

/// タイムエントリーをJSONファイルに保存するストア。
///
/// ファイルが存在しない場合はエントリーがないものとして扱う。
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// 新しい`LocalStore`を返す。
    ///
    /// # Arguments
    ///
    /// * `path` - 保存先のJSONファイル
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<TimeEntry>> {
        let exists = fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check {}", self.path.display()))?;
        if !exists {
            debug!("{} does not exist yet", self.path.display());
            return Ok(vec![]);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let entries = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        Ok(entries)
    }

    async fn save(&self, entries: &mut [TimeEntry]) -> Result<()> {
        entries.sort_by_key(|entry| (entry.date, entry.start_time()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(entries).context("Failed to serialize time entries")?;
        fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Saved {} entries to {}", entries.len(), self.path.display());

        Ok(())
    }
}

#[async_trait]
impl EntryStore for LocalStore {
    async fn list_entries(&self, date: Option<NaiveDate>) -> Result<Vec<TimeEntry>> {
        let mut entries = self.load().await?;
        if let Some(date) = date {
            entries.retain(|entry| entry.date == date);
        }
        entries.sort_by_key(|entry| (entry.date, entry.start_time()));

        Ok(entries)
    }

    async fn add_entry(&self, entry: NewTimeEntry) -> Result<TimeEntry> {
        let mut entries = self.load().await?;
        let entry = TimeEntry::new(Uuid::new_v4().to_string(), entry);
        entries.push(entry.clone());
        self.save(&mut entries).await?;
        info!("Added time entry {}", entry.id);

        Ok(entry)
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.save(&mut entries).await?;
        info!("Deleted time entry {}", id);

        Ok(true)
    }
}
