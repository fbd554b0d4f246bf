//! タイムエントリーの集計。
//!
//! 所要時間の計算、日毎のタグ別集計、直近7日間の平均、前週との比較を行う。
//! いずれも引数のみに依存する純粋な関数で、入力のエントリーは変更しない。

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::TrackerError;
use crate::tag::Tag;
use crate::time_entry::{parse_time_of_day, TimeEntry};

/// 平均を算出する期間の日数。
const WINDOW_DAYS: i64 = 7;

/// 前週との比較結果の分類。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    /// 前週の平均が0で、今週は記録がある。
    New,
}

/// タグ毎の前週との比較結果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyStat {
    pub tag: Tag,
    pub current_week_avg: i64,
    pub previous_week_avg: i64,
    /// 前週の平均が0の場合は`None`。
    pub change_percentage: Option<i64>,
    pub trend: Trend,
}

/// 1日分の集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub tag_totals: BTreeMap<Tag, i64>,
    pub total_tracked_minutes: i64,
    pub total_tracked_hours: f64,
    pub entries_count: usize,
}

/// 指定した日付の開始・終了時刻から所要時間(分)を計算する。
///
/// 終了時刻が開始時刻より前の場合は日を跨いだものとして扱う。
/// 開始時刻と終了時刻が等しい場合は0分とする。
///
/// # Arguments
///
/// * `date` - エントリーの日付
/// * `start` - 開始時刻
/// * `end` - 終了時刻
///
/// # Examples
///
/// ```
/// let minutes = compute_duration(date, "23:30", "00:15")?;
/// assert_eq!(minutes, 45);
/// ```
pub fn compute_duration(date: NaiveDate, start: &str, end: &str) -> Result<i64, TrackerError> {
    let start = date.and_time(parse_time_of_day(start)?);
    let end = date.and_time(parse_time_of_day(end)?);

    Ok(duration_between(start, end))
}

/// 2つの日時の間の所要時間(分)を計算する。
///
/// `end`が`start`より前の場合は`end`を1日進める。30秒以上は切り上げる。
pub fn duration_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let end = if end < start {
        end + Duration::days(1)
    } else {
        end
    };
    let seconds = (end - start).num_seconds();

    (seconds + 30).div_euclid(60)
}

/// 指定した日付に帰属するエントリーを入力順のまま返す。
pub fn entries_for_date(entries: &[TimeEntry], date: NaiveDate) -> Vec<&TimeEntry> {
    entries.iter().filter(|entry| entry.date == date).collect()
}

/// 指定した日付のタグ毎の合計時間(分)を返す。
///
/// エントリーのないタグは含まない。
pub fn totals_by_tag(entries: &[TimeEntry], date: NaiveDate) -> BTreeMap<Tag, i64> {
    entries_for_date(entries, date)
        .into_iter()
        .fold(BTreeMap::new(), |mut totals, entry| {
            *totals.entry(entry.tag.bucket()).or_insert(0) += entry.duration_minutes();
            totals
        })
}

/// `reference_date`を含む直近7日間のタグ毎の1日平均(分)を返す。
///
/// エントリーのない日も0分として数え、常に7で割る。
pub fn weekly_averages(entries: &[TimeEntry], reference_date: NaiveDate) -> BTreeMap<Tag, i64> {
    let sums = (0..WINDOW_DAYS)
        .map(|offset| reference_date - Duration::days(offset))
        .flat_map(|date| totals_by_tag(entries, date))
        .fold(BTreeMap::new(), |mut sums, (tag, minutes)| {
            *sums.entry(tag).or_insert(0) += minutes;
            sums
        });

    sums.into_iter()
        .map(|(tag, total)| (tag, divide_rounded(total, WINDOW_DAYS)))
        .collect()
}

/// 直近7日間とその前の7日間の平均を比較する。
///
/// どちらかの期間に記録のあるタグを全て含み、タグ順に並べる。
pub fn weekly_trend(entries: &[TimeEntry], reference_date: NaiveDate) -> Vec<WeeklyStat> {
    let current = weekly_averages(entries, reference_date);
    let previous = weekly_averages(entries, reference_date - Duration::days(WINDOW_DAYS));

    let tags: BTreeSet<&Tag> = current.keys().chain(previous.keys()).collect();

    tags.into_iter()
        .map(|tag| {
            let current_week_avg = current.get(tag).copied().unwrap_or(0);
            let previous_week_avg = previous.get(tag).copied().unwrap_or(0);
            let (change_percentage, trend) = compare(current_week_avg, previous_week_avg);

            WeeklyStat {
                tag: tag.clone(),
                current_week_avg,
                previous_week_avg,
                change_percentage,
                trend,
            }
        })
        .collect()
}

/// 1日分の集計結果を返す。
pub fn daily_summary(entries: &[TimeEntry], date: NaiveDate) -> DailySummary {
    let day_entries = entries_for_date(entries, date);
    let total_tracked_minutes: i64 = day_entries
        .iter()
        .map(|entry| entry.duration_minutes())
        .sum();

    DailySummary {
        date,
        tag_totals: totals_by_tag(entries, date),
        total_tracked_minutes,
        total_tracked_hours: (total_tracked_minutes as f64 / 60.0 * 100.0).round() / 100.0,
        entries_count: day_entries.len(),
    }
}

fn compare(current: i64, previous: i64) -> (Option<i64>, Trend) {
    if previous == 0 {
        return if current > 0 {
            (None, Trend::New)
        } else {
            (Some(0), Trend::Stable)
        };
    }

    let change = ((current - previous) as f64 / previous as f64 * 100.0).round() as i64;
    let trend = match change {
        c if c > 0 => Trend::Increasing,
        c if c < 0 => Trend::Decreasing,
        _ => Trend::Stable,
    };

    (Some(change), trend)
}

/// 四捨五入した商を返す。`value`は0以上。
fn divide_rounded(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2).div_euclid(divisor)
}
