use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain_types::DailyResult;

/// 交易日被跳過的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 預測器沒有返回任何候選
    NoPrediction,
    /// 所有候選當日都沒有報價，例如休市
    NoMarketData,
    /// 預測或結算過程失敗
    Failed(String),
}

impl SkipReason {
    /// 用於指標標籤的簡短名稱
    pub fn as_label(&self) -> &'static str {
        match self {
            SkipReason::NoPrediction => "no_prediction",
            SkipReason::NoMarketData => "no_market_data",
            SkipReason::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPrediction => write!(f, "沒有可用預測"),
            SkipReason::NoMarketData => write!(f, "沒有市場數據"),
            SkipReason::Failed(message) => write!(f, "處理失敗: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// 一次回測的完整輸出
///
/// `results` 只包含成功處理的交易日，按日期遞減排列；
/// `days_attempted` 計入被跳過的交易日。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRun {
    pub run_id: Uuid,
    pub start_date: NaiveDate,
    pub budget: f64,
    pub days_attempted: usize,
    pub results: Vec<DailyResult>,
    pub skipped: Vec<SkippedDay>,
}

impl BacktestRun {
    pub fn new(start_date: NaiveDate, budget: f64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            start_date,
            budget,
            days_attempted: 0,
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// 所有交易日的已實現損益總和
    pub fn total_realized_profit(&self) -> f64 {
        self.results.iter().map(|r| r.realized_profit()).sum()
    }

    /// 所有嘗試過的日期（成功與跳過），按日期遞減排列
    pub fn attempted_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .results
            .iter()
            .map(|r| r.date())
            .chain(self.skipped.iter().map(|s| s.date))
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_labels() {
        assert_eq!(SkipReason::NoPrediction.as_label(), "no_prediction");
        assert_eq!(SkipReason::NoMarketData.as_label(), "no_market_data");
        assert_eq!(SkipReason::Failed("x".into()).as_label(), "failed");
        assert!(SkipReason::Failed("boom".into()).to_string().contains("boom"));
    }

    #[test]
    fn test_empty_run() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let run = BacktestRun::new(start, 1000.0);
        assert_eq!(run.total_realized_profit(), 0.0);
        assert!(run.attempted_dates().is_empty());
        assert_ne!(run.run_id, BacktestRun::new(start, 1000.0).run_id);
    }
}
