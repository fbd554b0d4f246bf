use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;

use crate::time_entry::{NewTimeEntry, TimeEntry};

/// タイムエントリーを保存するリポジトリ。
///
/// 取得したエントリーは日付、開始時刻の順に並んでいる。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// タイムエントリーを取得する。
    ///
    /// # Arguments
    ///
    /// * `date` - 指定した場合はその日付に帰属するエントリーのみを返す
    async fn list_entries(&self, date: Option<NaiveDate>) -> Result<Vec<TimeEntry>>;

    /// タイムエントリーを追加し、識別子と所要時間を設定したエントリーを返す。
    async fn add_entry(&self, entry: NewTimeEntry) -> Result<TimeEntry>;

    /// タイムエントリーを削除する。
    ///
    /// 該当するエントリーがなかった場合は`false`を返す。
    async fn delete_entry(&self, id: &str) -> Result<bool>;
}
