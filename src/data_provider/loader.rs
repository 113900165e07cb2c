use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::domain_types::{DailyBar, QuoteTable};

/// 市場數據源特性 - 定義數據提供模組的核心接口
///
/// 實現必須「軟失敗」：數據不可用或格式錯誤時返回空報價表並記錄日誌，而不是返回錯誤。
pub trait MarketDataSource: Send + Sync {
    /// 加載 `[start, end]`（閉區間）內的日線數據
    fn fetch_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> QuoteTable;

    /// 加載單一交易日的數據點
    fn fetch_day(&self, symbol: &str, date: NaiveDate) -> Option<DailyBar> {
        self.fetch_quotes(symbol, date, date).on(date).copied()
    }
}

/// 基於內存的數據源，用於測試與示範
#[derive(Debug, Default)]
pub struct InMemoryMarketDataSource {
    tables: RwLock<HashMap<String, QuoteTable>>,
}

impl InMemoryMarketDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 設置某標的的完整數據，覆蓋已有內容
    pub fn insert(&self, symbol: impl Into<String>, bars: Vec<DailyBar>) {
        let symbol = symbol.into();
        let table = QuoteTable::new(symbol.clone(), bars);
        self.tables.write().insert(symbol, table);
    }

    pub fn with_bars(self, symbol: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        self.insert(symbol, bars);
        self
    }
}

impl MarketDataSource for InMemoryMarketDataSource {
    fn fetch_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> QuoteTable {
        match self.tables.read().get(symbol) {
            Some(table) => table.between(start, end),
            None => {
                debug!(symbol, "內存數據源沒有此標的");
                QuoteTable::empty(symbol)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_fetch_quotes_filters_range() {
        let source = InMemoryMarketDataSource::new().with_bars(
            "SBIN.NS",
            vec![
                DailyBar::new(day(2), 600.0, 605.0),
                DailyBar::new(day(3), 605.0, 610.0),
                DailyBar::new(day(4), 610.0, 600.0),
            ],
        );

        let table = source.fetch_quotes("SBIN.NS", day(3), day(4));
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_date(), Some(day(3)));
    }

    #[test]
    fn test_unknown_symbol_is_empty_not_error() {
        let source = InMemoryMarketDataSource::new();
        assert!(source.fetch_quotes("ITC.NS", day(2), day(4)).is_empty());
        assert!(source.fetch_day("ITC.NS", day(2)).is_none());
    }

    #[test]
    fn test_fetch_day() {
        let source = InMemoryMarketDataSource::new()
            .with_bars("LT.NS", vec![DailyBar::new(day(2), 3500.0, 3510.0)]);
        assert_eq!(source.fetch_day("LT.NS", day(2)).map(|b| b.close), Some(3510.0));
        assert!(source.fetch_day("LT.NS", day(3)).is_none());
    }
}
