// time_utils.rs
//
// 交易日曆與日期轉換工具。
// 1. 以週一至週五為交易日，不處理假期
// 2. 推導回測訓練窗口
// 3. 報表與數據文件使用的 `%Y-%m-%d` 日期格式

use chrono::{Datelike, Duration, Local, NaiveDate, ParseResult, Weekday};

/// 報表與數據文件的日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 是否為交易日（週一至週五）
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 嚴格早於 `date` 的最近交易日
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date - Duration::days(1);
    while !is_business_day(day) {
        day = day - Duration::days(1);
    }
    day
}

/// 嚴格晚於 `date` 的最近交易日
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date + Duration::days(1);
    while !is_business_day(day) {
        day = day + Duration::days(1);
    }
    day
}

/// 測試日的訓練窗口 `[test_day - window_days, test_day - 1]`（閉區間，日曆日）
pub fn training_window(test_day: NaiveDate, window_days: i64) -> (NaiveDate, NaiveDate) {
    (
        test_day - Duration::days(window_days),
        test_day - Duration::days(1),
    )
}

/// 回測依序嘗試的 `n` 個日期：第一個是 `start`，其後每次退到前一個交易日
pub fn business_days_back(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut day = start;
    for _ in 0..n {
        days.push(day);
        day = previous_business_day(day);
    }
    days
}

/// 本地時區的今日
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-06 是週五，2025-06-09 是週一
    #[rstest]
    #[case(date(2025, 6, 10), date(2025, 6, 9))]
    #[case(date(2025, 6, 9), date(2025, 6, 6))]
    #[case(date(2025, 6, 8), date(2025, 6, 6))]
    #[case(date(2025, 6, 7), date(2025, 6, 6))]
    #[case(date(2025, 3, 3), date(2025, 2, 28))]
    fn test_previous_business_day(#[case] input: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(previous_business_day(input), expected);
    }

    #[rstest]
    #[case(date(2025, 6, 5), date(2025, 6, 6))]
    #[case(date(2025, 6, 6), date(2025, 6, 9))]
    #[case(date(2025, 6, 7), date(2025, 6, 9))]
    #[case(date(2025, 6, 8), date(2025, 6, 9))]
    #[case(date(2025, 12, 31), date(2026, 1, 1))]
    fn test_next_business_day(#[case] input: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(next_business_day(input), expected);
    }

    #[test]
    fn test_is_business_day() {
        assert!(is_business_day(date(2025, 6, 6)));
        assert!(!is_business_day(date(2025, 6, 7)));
        assert!(!is_business_day(date(2025, 6, 8)));
    }

    #[test]
    fn test_training_window() {
        let (start, end) = training_window(date(2025, 6, 10), 60);
        assert_eq!(start, date(2025, 4, 11));
        assert_eq!(end, date(2025, 6, 9));
    }

    #[test]
    fn test_business_days_back_starts_on_given_day() {
        // 從週日開始：第一個嘗試日仍是週日，之後只走交易日
        let days = business_days_back(date(2025, 6, 8), 4);
        assert_eq!(
            days,
            vec![date(2025, 6, 8), date(2025, 6, 6), date(2025, 6, 5), date(2025, 6, 4)]
        );
        assert!(business_days_back(date(2025, 6, 8), 0).is_empty());
    }

    #[test]
    fn test_date_format_round_trip() {
        let d = parse_date(" 2025-06-09 ").unwrap();
        assert_eq!(d, date(2025, 6, 9));
        assert_eq!(format_date(d), "2025-06-09");
        assert!(parse_date("09/06/2025").is_err());
    }
}
