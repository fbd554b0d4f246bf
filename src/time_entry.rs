use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::aggregator::duration_between;
use crate::error::TrackerError;
use crate::tag::Tag;

/// 受け付ける時刻の書式。12時間表記は旧APIの形式。
const TIME_FORMATS: [&str; 5] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

/// 新しく記録するタイムエントリーの内容。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
    pub tag: Tag,
}

/// 記録済みのタイムエントリー。
///
/// `date`は開始時刻が属する日付で、日を跨ぐエントリーも開始日に帰属する。
/// 所要時間は生成時に開始・終了時刻から算出し、単独では変更できない。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TimeEntryRecord")]
pub struct TimeEntry {
    pub id: String,
    pub date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration_minutes: i64,
    pub description: String,
    pub tag: Tag,
}

/// 保存形式。`duration_minutes`は読み込み時に再計算する。
#[derive(Deserialize)]
struct TimeEntryRecord {
    id: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    description: String,
    tag: Tag,
}

impl From<TimeEntryRecord> for TimeEntry {
    fn from(record: TimeEntryRecord) -> Self {
        TimeEntry::new(
            record.id,
            NewTimeEntry {
                date: record.date,
                start_time: record.start_time,
                end_time: record.end_time,
                description: record.description,
                tag: record.tag,
            },
        )
    }
}

impl TimeEntry {
    /// 新しい`TimeEntry`を返す。
    ///
    /// # Arguments
    ///
    /// * `id` - エントリーの識別子
    /// * `entry` - 記録する内容
    pub fn new(id: impl Into<String>, entry: NewTimeEntry) -> Self {
        let duration_minutes = entry_duration(entry.date, entry.start_time, entry.end_time);

        Self {
            id: id.into(),
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            duration_minutes,
            description: entry.description,
            tag: entry.tag,
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    /// 所要時間(分)。
    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// 識別子を除いた内容を返す。
    pub fn to_new(&self) -> NewTimeEntry {
        NewTimeEntry {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description.clone(),
            tag: self.tag.clone(),
        }
    }
}

fn entry_duration(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> i64 {
    duration_between(date.and_time(start_time), date.and_time(end_time))
}

/// 時刻をパースする。
///
/// `HH:MM`、`HH:MM:SS`、`H:MM AM/PM`の形式を受け付ける。
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, TrackerError> {
    let trimmed = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| TrackerError::InvalidTimeFormat(s.to_string()))
}

/// 日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::InvalidDateFormat(s.to_string()))
}

/// 時刻を`H:MM AM/PM`の形式で返す。
pub fn format_time_12h(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
