use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日線 OHLCV 數據點
///
/// 只有 `open` 與 `close` 是必要欄位，其餘欄位在數據源缺失時為 `None`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl DailyBar {
    /// 只含開盤與收盤價的數據點
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// 完整的 OHLCV 數據點
    pub fn ohlcv(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high: Some(high),
            low: Some(low),
            close,
            volume: Some(volume),
        }
    }

    /// 日內報酬 `(close - open) / open`，開盤價不可用時返回 `None`
    pub fn intraday_return(&self) -> Option<f64> {
        if !self.has_usable_prices() {
            return None;
        }
        Some((self.close - self.open) / self.open)
    }

    /// 開盤與收盤價皆為有限正數
    pub fn has_usable_prices(&self) -> bool {
        self.open.is_finite() && self.open > 0.0 && self.close.is_finite() && self.close > 0.0
    }
}

/// 單一交易日的報價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub open: f64,
    pub close: f64,
}

impl PriceQuote {
    pub fn from_bar(symbol: impl Into<String>, bar: &DailyBar) -> Self {
        Self {
            symbol: symbol.into(),
            open: bar.open,
            close: bar.close,
        }
    }
}
