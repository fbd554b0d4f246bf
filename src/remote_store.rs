use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Timelike};
use log::{info, warn};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::aggregator::compute_duration;
use crate::store::EntryStore;
use crate::tag::TagSet;
use crate::time_entry::{format_time_12h, parse_date, parse_time_of_day, NewTimeEntry, TimeEntry};

/// APIのレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct RemoteTimeEntry {
    id: String,
    start_time: String,
    end_time: String,
    date: String,
    description: String,
    tag: String,
    duration_minutes: i64,
}

/// エントリー作成時のリクエストボディ。
#[derive(Debug, Serialize)]
struct RemoteTimeEntryCreate<'a> {
    start_time: String,
    end_time: String,
    date: String,
    description: &'a str,
    tag: &'a str,
}

/// REST APIにタイムエントリーを保存するストア。
///
/// APIは時刻を`H:MM AM/PM`形式で受け取るため、分単位の時刻のみを保存できる。
///
/// # Examples
///
/// ```
/// let store = RemoteStore::new("http://localhost:8001", TagSet::default());
/// let entries = store.list_entries(None).await?;
/// ```
pub struct RemoteStore {
    client: Client,
    api_url: String,
    tag_set: TagSet,
}

impl RemoteStore {
    /// 新しい`RemoteStore`を返す。
    ///
    /// # Arguments
    ///
    /// * `base_url` - APIサーバーのURL。`/api`は含めない
    /// * `tag_set` - レスポンスのタグを解釈するためのタグ集合
    pub fn new(base_url: &str, tag_set: TagSet) -> Self {
        Self {
            client: Client::new(),
            api_url: format!("{}/api", base_url.trim_end_matches('/')),
            tag_set,
        }
    }

    /// レスポンスを`TimeEntry`に変換する。
    ///
    /// 所要時間はサーバーの値ではなく開始・終了時刻から算出する。
    fn convert(&self, remote: RemoteTimeEntry) -> Result<TimeEntry> {
        let date = parse_date(&remote.date)?;
        let duration_minutes = compute_duration(date, &remote.start_time, &remote.end_time)?;
        if duration_minutes != remote.duration_minutes {
            warn!(
                "Duration of {} differs from server: {} != {}",
                remote.id, duration_minutes, remote.duration_minutes
            );
        }

        Ok(TimeEntry::new(
            remote.id,
            NewTimeEntry {
                date,
                start_time: parse_time_of_day(&remote.start_time)?,
                end_time: parse_time_of_day(&remote.end_time)?,
                description: remote.description,
                tag: self.tag_set.resolve(&remote.tag),
            },
        ))
    }
}

#[async_trait]
impl EntryStore for RemoteStore {
    async fn list_entries(&self, date: Option<NaiveDate>) -> Result<Vec<TimeEntry>> {
        let mut request = self
            .client
            .get(format!("{}/time-entries", self.api_url))
            .header(CONTENT_TYPE, "application/json");
        if let Some(date) = date {
            request = request.query(&[("date", date.format("%Y-%m-%d").to_string())]);
        }

        let remote_entries = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<RemoteTimeEntry>>()
            .await
            .context("Failed to deserialize response")?;
        info!("length of time entries: {}", remote_entries.len());

        let mut entries = remote_entries
            .into_iter()
            .map(|remote| self.convert(remote))
            .collect::<Result<Vec<_>>>()
            .context("Failed to convert time entries")?;
        entries.sort_by_key(|entry| (entry.date, entry.start_time()));

        Ok(entries)
    }

    async fn add_entry(&self, entry: NewTimeEntry) -> Result<TimeEntry> {
        for time in [entry.start_time, entry.end_time] {
            if time.second() != 0 || time.nanosecond() != 0 {
                bail!("The REST API only stores whole minutes: {}", time);
            }
        }

        let body = RemoteTimeEntryCreate {
            start_time: format_time_12h(entry.start_time),
            end_time: format_time_12h(entry.end_time),
            date: entry.date.format("%Y-%m-%d").to_string(),
            description: &entry.description,
            tag: entry.tag.name(),
        };

        let remote = self
            .client
            .post(format!("{}/time-entries", self.api_url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<RemoteTimeEntry>()
            .await
            .context("Failed to deserialize response")?;
        info!("Added time entry {}", remote.id);

        self.convert(remote)
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(format!("{}/time-entries/{}", self.api_url, id))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.api_url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response
            .error_for_status()
            .context("Request returned an error status")?;
        info!("Deleted time entry {}", id);

        Ok(true)
    }
}
