use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::aggregator::{weekly_averages, weekly_trend, WeeklyStat};
use crate::datetime;
use crate::store::EntryStore;
use crate::tag::Tag;
use crate::time_entry::parse_date;

/// `weekly`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct WeeklyArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets the last day of the week in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,

    #[clap(long = "trend", help = "Compare with the previous 7 days")]
    pub trend: bool,
}

/// `weekly`サブコマンドの結果。
#[derive(Debug, PartialEq)]
pub enum WeeklyReport {
    Averages {
        reference_date: NaiveDate,
        averages: BTreeMap<Tag, i64>,
    },
    Trend {
        reference_date: NaiveDate,
        stats: Vec<WeeklyStat>,
    },
}

pub struct WeeklyCommand<'a, T: EntryStore + ?Sized> {
    store: &'a T,
}

impl<'a, T: EntryStore + ?Sized> WeeklyCommand<'a, T> {
    /// 新しい`WeeklyCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `weekly`サブコマンドの処理を行う。
    ///
    /// 指定された日付を最終日とする7日間のタグ毎の1日平均を返す。
    /// `--trend`が指定された場合は、その前の7日間との比較結果を返す。
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    ///
    /// # Arguments
    ///
    /// * `weekly` - `weekly`サブコマンドの引数
    pub async fn run(&self, weekly: WeeklyArgs) -> Result<WeeklyReport> {
        let reference_date = weekly.date.unwrap_or_else(datetime::today);
        info!("Reference date: {}", reference_date);

        let entries = self
            .store
            .list_entries(None)
            .await
            .context("Failed to retrieve time entries")?;
        info!("Time entries retrieved successfully.");

        let report = if weekly.trend {
            WeeklyReport::Trend {
                reference_date,
                stats: weekly_trend(&entries, reference_date),
            }
        } else {
            WeeklyReport::Averages {
                reference_date,
                averages: weekly_averages(&entries, reference_date),
            }
        };

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, NaiveTime};
    use mockall::predicate::eq;

    use super::{WeeklyArgs, WeeklyCommand, WeeklyReport};
    use crate::aggregator::{Trend, WeeklyStat};
    use crate::datetime::mock_datetime;
    use crate::store::MockEntryStore;
    use crate::tag::Tag;
    use crate::time_entry::{NewTimeEntry, TimeEntry};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn entries() -> Vec<TimeEntry> {
        [(2, 9, 12), (9, 9, 13)]
            .iter()
            .enumerate()
            .map(|(index, (day, start, end))| {
                TimeEntry::new(
                    index.to_string(),
                    NewTimeEntry {
                        date: date(*day),
                        start_time: NaiveTime::from_hms_opt(*start, 0, 0).unwrap(),
                        end_time: NaiveTime::from_hms_opt(*end, 30, 0).unwrap(),
                        description: "study".to_string(),
                        tag: Tag::Productive,
                    },
                )
            })
            .collect()
    }

    fn store_with_entries() -> MockEntryStore {
        let mut store = MockEntryStore::new();
        store
            .expect_list_entries()
            .with(eq(None))
            .times(1)
            .returning(|_| Ok(entries()));
        store
    }

    /// 日付を指定しない場合は今日を最終日とすることを確認する。
    #[tokio::test]
    async fn test_weekly_command_averages() {
        mock_datetime::set_mock_date(date(14));
        let store = store_with_entries();

        let command = WeeklyCommand::new(&store);
        let report = command
            .run(WeeklyArgs {
                date: None,
                trend: false,
            })
            .await
            .unwrap();
        mock_datetime::clear_mock_date();

        assert_eq!(
            report,
            WeeklyReport::Averages {
                reference_date: date(14),
                averages: BTreeMap::from([(Tag::Productive, 39)]),
            }
        );
    }

    #[tokio::test]
    async fn test_weekly_command_trend() {
        let store = store_with_entries();

        let command = WeeklyCommand::new(&store);
        let report = command
            .run(WeeklyArgs {
                date: Some(date(14)),
                trend: true,
            })
            .await
            .unwrap();

        assert_eq!(
            report,
            WeeklyReport::Trend {
                reference_date: date(14),
                stats: vec![WeeklyStat {
                    tag: Tag::Productive,
                    current_week_avg: 39,
                    previous_week_avg: 30,
                    change_percentage: Some(30),
                    trend: Trend::Increasing,
                }],
            }
        );
    }
}
