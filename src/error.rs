use thiserror::Error;

/// タイムエントリーの入力値に関するエラー。
///
/// ストアやコマンドでは`anyhow::Error`に変換して扱う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// 時刻として解釈できない文字列が渡された。
    #[error("Invalid time format: {0:?} (expected HH:MM, HH:MM:SS or H:MM AM/PM)")]
    InvalidTimeFormat(String),

    /// 日付として解釈できない文字列が渡された。
    #[error("Invalid date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    /// 登録されていないタグが指定された。
    #[error("Unknown tag: {0:?}")]
    UnknownTag(String),
}
