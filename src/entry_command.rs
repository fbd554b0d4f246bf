use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::datetime;
use crate::store::EntryStore;
use crate::tag::{available_tags, Tag, TagSet};
use crate::time_entry::{parse_date, parse_time_of_day, NewTimeEntry, TimeEntry};

/// `add`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct AddArgs {
    #[clap(help = "Start time (HH:MM or H:MM AM/PM)")]
    pub start: String,

    #[clap(help = "End time; earlier than the start time means the next day")]
    pub end: String,

    #[clap(help = "What you did")]
    pub description: String,

    #[clap(short = 't', long = "tag", help = "Category of the entry")]
    pub tag: String,

    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,
}

/// `list`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Only show entries of the date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,
}

/// タイムエントリーの追加、一覧、削除とタグ一覧を行う。
pub struct EntryCommand<'a, T: EntryStore + ?Sized> {
    store: &'a T,
    tag_set: &'a TagSet,
}

impl<'a, T: EntryStore + ?Sized> EntryCommand<'a, T> {
    /// 新しい`EntryCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - タイムエントリーを保存するリポジトリ
    /// * `tag_set` - 受け付けるタグの集合
    pub fn new(store: &'a T, tag_set: &'a TagSet) -> Self {
        Self { store, tag_set }
    }

    /// `add`サブコマンドの処理を行う。
    ///
    /// 時刻やタグが不正な場合は保存せずにエラーを返す。
    pub async fn add(&self, args: AddArgs) -> Result<TimeEntry> {
        let tag = self
            .tag_set
            .parse(&args.tag)
            .context("Failed to parse tag")?;
        let entry = NewTimeEntry {
            date: args.date.unwrap_or_else(datetime::today),
            start_time: parse_time_of_day(&args.start).context("Failed to parse start time")?,
            end_time: parse_time_of_day(&args.end).context("Failed to parse end time")?,
            description: args.description,
            tag,
        };

        let entry = self
            .store
            .add_entry(entry)
            .await
            .context("Failed to add time entry")?;
        info!(
            "Added {} minutes of {} on {}",
            entry.duration_minutes(),
            entry.tag,
            entry.date
        );

        Ok(entry)
    }

    /// `list`サブコマンドの処理を行う。
    pub async fn list(&self, args: ListArgs) -> Result<Vec<TimeEntry>> {
        self.store
            .list_entries(args.date)
            .await
            .context("Failed to retrieve time entries")
    }

    /// `delete`サブコマンドの処理を行う。
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self
            .store
            .delete_entry(id)
            .await
            .with_context(|| format!("Failed to delete time entry {}", id))?;
        if !deleted {
            info!("Time entry {} was not found", id);
        }

        Ok(deleted)
    }

    /// `tags`サブコマンドの処理を行う。
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        let entries = self
            .store
            .list_entries(None)
            .await
            .context("Failed to retrieve time entries")?;

        Ok(available_tags(self.tag_set, &entries))
    }
}
