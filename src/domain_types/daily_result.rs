use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain_types::allocation::{total_invested, AllocationLine};

/// 單一持倉在收盤時的實際結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOutcome {
    pub symbol: String,
    pub invested: f64,
    pub close: f64,
    pub realized_profit: f64,
}

/// 一個回測交易日的結果，構造後不可變
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    date: NaiveDate,
    top_symbols: Vec<String>,
    allocations: Vec<AllocationLine>,
    outcomes: Vec<PositionOutcome>,
    total_invested: f64,
    realized_profit: f64,
}

impl DailyResult {
    /// 以分配計劃與當日收盤價結算
    ///
    /// `closes` 必須包含每一行分配的標的；缺少收盤價的行不會被計入。
    pub fn settle(
        date: NaiveDate,
        top_symbols: Vec<String>,
        allocations: Vec<AllocationLine>,
        closes: &HashMap<String, f64>,
    ) -> Self {
        let allocations: Vec<AllocationLine> = allocations
            .into_iter()
            .filter(|line| closes.contains_key(&line.symbol))
            .collect();

        let outcomes: Vec<PositionOutcome> = allocations
            .iter()
            .filter_map(|line| {
                closes.get(&line.symbol).map(|&close| PositionOutcome {
                    symbol: line.symbol.clone(),
                    invested: line.invested,
                    close,
                    realized_profit: line.realized_profit(close),
                })
            })
            .collect();

        let realized_profit = outcomes.iter().map(|o| o.realized_profit).sum();

        Self {
            date,
            top_symbols,
            total_invested: total_invested(&allocations),
            allocations,
            outcomes,
            realized_profit,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 預測器給出的候選標的，依預測順序排列
    pub fn top_symbols(&self) -> &[String] {
        &self.top_symbols
    }

    pub fn allocations(&self) -> &[AllocationLine] {
        &self.allocations
    }

    pub fn outcomes(&self) -> &[PositionOutcome] {
        &self.outcomes
    }

    pub fn total_invested(&self) -> f64 {
        self.total_invested
    }

    pub fn realized_profit(&self) -> f64 {
        self.realized_profit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_sums_realized_profit() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let allocations = vec![
            AllocationLine::new("A", 100.0, 0.02, 2.0),
            AllocationLine::new("B", 50.0, 0.01, 4.0),
        ];
        let closes = HashMap::from([("A".to_string(), 101.0), ("B".to_string(), 49.0)]);

        let result = DailyResult::settle(date, vec!["A".into(), "B".into()], allocations, &closes);

        assert_eq!(result.date(), date);
        assert_eq!(result.total_invested(), 400.0);
        // A: +1 * 2 = 2, B: -1 * 4 = -4
        assert!((result.realized_profit() - (-2.0)).abs() < 1e-9);
        assert_eq!(result.outcomes().len(), 2);
        assert_eq!(result.outcomes()[1].close, 49.0);
    }

    #[test]
    fn test_settle_drops_lines_without_close() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let allocations = vec![AllocationLine::new("A", 100.0, 0.02, 2.0)];
        let result = DailyResult::settle(date, vec!["A".into()], allocations, &HashMap::new());

        assert!(result.allocations().is_empty());
        assert_eq!(result.total_invested(), 0.0);
        assert_eq!(result.realized_profit(), 0.0);
    }
}
