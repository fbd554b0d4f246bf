use chrono::{Local, NaiveDate};

#[cfg(not(test))]
/// Localタイムゾーンでの今日の日付を取得する。
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}


#[cfg(test)]
pub use mock_datetime::today;

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};

    use super::mock_datetime;

    /// 何も設定しない場合は、今日の日付が取得できることを確認する。
    #[test]
    fn test_today() {
        mock_datetime::clear_mock_date();

        assert_eq!(mock_datetime::today(), Local::now().date_naive());
    }

    /// モック日付を設定した時に、その日付が取得できることを確認する。
    #[test]
    fn test_today_specific_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        mock_datetime::set_mock_date(date);

        assert_eq!(mock_datetime::today(), date);
    }

    /// モック日付をリセットした時に、今日の日付が取得できることを確認する。
    #[test]
    fn test_today_after_clear_mock_date() {
        mock_datetime::set_mock_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        mock_datetime::clear_mock_date();

        assert_eq!(mock_datetime::today(), Local::now().date_naive());
    }
}
