use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::aggregator::{daily_summary, DailySummary};
use crate::datetime;
use crate::store::EntryStore;
use crate::time_entry::{parse_date, TimeEntry};

/// 日毎の情報を出力するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct DailyArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,
}

/// `daily`サブコマンドの結果。
#[derive(Debug, PartialEq)]
pub struct DailyReport {
    pub entries: Vec<TimeEntry>,
    pub summary: DailySummary,
}

pub struct DailyCommand<'a, T: EntryStore + ?Sized> {
    store: &'a T,
}

impl<'a, T: EntryStore + ?Sized> DailyCommand<'a, T> {
    /// 新しい`DailyCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - タイムエントリーを保存するリポジトリ
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `daily`サブコマンドの処理を行う。
    ///
    /// 指定された日付に帰属するタイムエントリーとタグ毎の合計を返す。
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    ///
    /// # Arguments
    ///
    /// * `daily` - `daily`サブコマンドの引数
    pub async fn run(&self, daily: DailyArgs) -> Result<DailyReport> {
        let date = daily.date.unwrap_or_else(datetime::today);
        info!("Date: {}", date);

        let entries = self
            .store
            .list_entries(Some(date))
            .await
            .context("Failed to retrieve time entries")?;
        info!("Time entries retrieved successfully.");

        let summary = daily_summary(&entries, date);

        Ok(DailyReport { entries, summary })
    }
}
