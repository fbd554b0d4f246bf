use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::aggregator::{DailySummary, Trend, WeeklyStat};
use crate::tag::Tag;
use crate::time_entry::TimeEntry;

/// Consoleに集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// タイムエントリーを表示する。
    ///
    /// # Arguments
    ///
    /// * `time_entries` - 表示するタイムエントリー
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()>;

    /// 1日分のタグ毎の合計を表示する。
    fn show_daily_summary(&mut self, summary: &DailySummary) -> Result<()>;

    /// 直近7日間のタグ毎の1日平均を表示する。
    fn show_weekly_averages(
        &mut self,
        reference_date: NaiveDate,
        averages: &BTreeMap<Tag, i64>,
    ) -> Result<()>;

    /// 前週との比較結果を表示する。
    fn show_weekly_trend(&mut self, reference_date: NaiveDate, stats: &[WeeklyStat]) -> Result<()>;

    /// 利用可能なタグを表示する。
    fn show_tags(&mut self, tags: &[Tag]) -> Result<()>;
}

/// 集計結果をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // time entryを日付、開始時刻順のlist形式で表示する。
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()> {
        let mut sorted_entries = time_entries.to_vec();
        sorted_entries.sort_by_key(|entry| (entry.date, entry.start_time()));

        for entry in sorted_entries {
            writeln!(
                self.writer,
                "- {} {} ~ {} ({}) [{}] {} `{}`",
                entry.date.format("%Y-%m-%d"),
                entry.start_time().format("%H:%M"),
                entry.end_time().format("%H:%M"),
                format_minutes(entry.duration_minutes()),
                entry.tag,
                entry.description,
                entry.id
            )
            .with_context(|| format!("Failed to write time entry: {:?}", entry))?;
        }

        Ok(())
    }

    fn show_daily_summary(&mut self, summary: &DailySummary) -> Result<()> {
        writeln!(self.writer, "## {}", summary.date.format("%Y-%m-%d"))
            .context("Failed to write header")?;
        for (tag, minutes) in &summary.tag_totals {
            writeln!(self.writer, "- {}: {}", tag, format_minutes(*minutes))
                .with_context(|| format!("Failed to write total of {}", tag))?;
        }
        writeln!(
            self.writer,
            "- Total: {} ({:.2}h, {} entries)",
            format_minutes(summary.total_tracked_minutes),
            summary.total_tracked_hours,
            summary.entries_count
        )
        .context("Failed to write total")?;

        Ok(())
    }

    fn show_weekly_averages(
        &mut self,
        reference_date: NaiveDate,
        averages: &BTreeMap<Tag, i64>,
    ) -> Result<()> {
        writeln!(
            self.writer,
            "## Daily average, 7 days until {}",
            reference_date.format("%Y-%m-%d")
        )
        .context("Failed to write header")?;
        for (tag, minutes) in averages {
            writeln!(self.writer, "- {}: {}", tag, format_minutes(*minutes))
                .with_context(|| format!("Failed to write average of {}", tag))?;
        }

        Ok(())
    }

    fn show_weekly_trend(&mut self, reference_date: NaiveDate, stats: &[WeeklyStat]) -> Result<()> {
        writeln!(
            self.writer,
            "## Week over week, 7 days until {}",
            reference_date.format("%Y-%m-%d")
        )
        .context("Failed to write header")?;
        for stat in stats {
            let change = match stat.change_percentage {
                Some(percentage) => format!("{:+}%", percentage),
                None => "-".to_string(),
            };
            writeln!(
                self.writer,
                "- {}: {} (previous {}) {} {}",
                stat.tag,
                format_minutes(stat.current_week_avg),
                format_minutes(stat.previous_week_avg),
                change,
                trend_label(stat.trend)
            )
            .with_context(|| format!("Failed to write trend of {}", stat.tag))?;
        }

        Ok(())
    }

    fn show_tags(&mut self, tags: &[Tag]) -> Result<()> {
        for tag in tags {
            writeln!(self.writer, "- {}", tag)
                .with_context(|| format!("Failed to write tag {}", tag))?;
        }

        Ok(())
    }
}

/// 分を`1h 05m`の形式で返す。
fn format_minutes(minutes: i64) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "increasing",
        Trend::Decreasing => "decreasing",
        Trend::Stable => "stable",
        Trend::New => "new",
    }
}
