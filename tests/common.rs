#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use mockall::mock;
use std::io::Write;
use std::path::Path;

use stock_whisper::domain_types::{Candidate, DailyBar};
use stock_whisper::forecast::{ForecastError, Forecaster};
use stock_whisper::utils::is_business_day;

mock! {
    pub Forecaster {}

    impl Forecaster for Forecaster {
        fn predict_top_n(
            &self,
            symbols: &[String],
            start: NaiveDate,
            end: NaiveDate,
            n: usize,
        ) -> Result<Vec<Candidate>, ForecastError>;
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2025-06-09 是週一
pub fn monday() -> NaiveDate {
    date(2025, 6, 9)
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// `[from, to]` 內每個交易日一根日線，日內報酬固定為 `ret`
pub fn business_day_bars(from: NaiveDate, to: NaiveDate, open: f64, ret: f64) -> Vec<DailyBar> {
    let mut bars = Vec::new();
    let mut day = from;
    while day <= to {
        if is_business_day(day) {
            bars.push(DailyBar::new(day, open, open * (1.0 + ret)));
        }
        day = day + Duration::days(1);
    }
    bars
}

/// 以 Yahoo 風格的欄位寫出一個報價文件
pub fn write_quote_csv(dir: &Path, symbol: &str, bars: &[DailyBar]) {
    let mut file = std::fs::File::create(dir.join(format!("{}.csv", symbol))).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{},1000",
            bar.date.format("%Y-%m-%d"),
            bar.open,
            bar.open.max(bar.close),
            bar.open.min(bar.close),
            bar.close,
            bar.close
        )
        .unwrap();
    }
}
