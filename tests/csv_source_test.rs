mod common;

use std::fs;
use tempfile::TempDir;

use common::{business_day_bars, date, write_quote_csv};
use stock_whisper::data_provider::{CsvMarketDataSource, MarketDataSource};

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let bars = business_day_bars(date(2025, 6, 2), date(2025, 6, 13), 100.0, 0.01);
    write_quote_csv(dir.path(), "INFY.NS", &bars);
    dir
}

#[test]
fn test_fetch_quotes_is_inclusive() {
    let dir = data_dir();
    let source = CsvMarketDataSource::new(dir.path(), 4);

    let table = source.fetch_quotes("INFY.NS", date(2025, 6, 3), date(2025, 6, 9));
    // 3, 4, 5, 6, 9
    assert_eq!(table.len(), 5);
    assert_eq!(table.first_date(), Some(date(2025, 6, 3)));
    assert_eq!(table.last_date(), Some(date(2025, 6, 9)));
}

#[test]
fn test_fetch_day_and_weekend() {
    let dir = data_dir();
    let source = CsvMarketDataSource::new(dir.path(), 4);

    let bar = source.fetch_day("INFY.NS", date(2025, 6, 4)).unwrap();
    assert_eq!(bar.open, 100.0);
    assert!((bar.close - 101.0).abs() < 1e-9);
    assert!(source.fetch_day("INFY.NS", date(2025, 6, 7)).is_none());
}

#[test]
fn test_missing_and_malformed_files_yield_empty_tables() {
    let dir = data_dir();
    fs::write(dir.path().join("BROKEN.NS.csv"), "Date,Volume\n2025-06-02,100\n").unwrap();
    let source = CsvMarketDataSource::new(dir.path(), 4);

    assert!(source.fetch_quotes("UNKNOWN.NS", date(2025, 6, 2), date(2025, 6, 13)).is_empty());
    assert!(source.fetch_quotes("BROKEN.NS", date(2025, 6, 2), date(2025, 6, 13)).is_empty());
}

#[test]
fn test_cached_after_first_load() {
    let dir = data_dir();
    let source = CsvMarketDataSource::new(dir.path(), 4);
    assert_eq!(source.fetch_quotes("INFY.NS", date(2025, 6, 2), date(2025, 6, 13)).len(), 10);

    // 文件被刪除後仍由快取提供
    fs::remove_file(source.path_for("INFY.NS")).unwrap();
    assert_eq!(source.fetch_quotes("INFY.NS", date(2025, 6, 2), date(2025, 6, 13)).len(), 10);
}
