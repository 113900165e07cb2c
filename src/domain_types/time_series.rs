use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain_types::data_point::DailyBar;

/// 單一標的的日線報價表，按日期遞增排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteTable {
    pub symbol: String,
    bars: Vec<DailyBar>,
}

impl QuoteTable {
    /// 創建報價表，數據點會按日期排序
    pub fn new(symbol: impl Into<String>, mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// 空報價表，表示數據不可用
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// 獲取數據點數量
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 檢查是否為空
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    /// 指定日期的數據點
    pub fn on(&self, date: NaiveDate) -> Option<&DailyBar> {
        self.bars
            .binary_search_by_key(&date, |bar| bar.date)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    /// 最近的 `n` 個數據點
    pub fn tail(&self, n: usize) -> &[DailyBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// 截取閉區間 `[start, end]` 內的數據點
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> QuoteTable {
        let bars = self
            .bars
            .iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            bars,
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }
}
