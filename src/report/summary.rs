use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

use crate::report::writer::DailyRecord;

/// 累積損益序列中的一點
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub realized_profit: f64,
    pub cumulative_profit: f64,
}

/// 按日期遞增排列的每日與累積損益
pub fn cumulative_profit(records: &[DailyRecord]) -> Vec<CumulativePoint> {
    let mut ordered: Vec<&DailyRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.date);

    let mut running = 0.0;
    ordered
        .into_iter()
        .map(|record| {
            running += record.realized_profit;
            CumulativePoint {
                date: record.date,
                realized_profit: record.realized_profit,
                cumulative_profit: running,
            }
        })
        .collect()
}

/// 回測彙總統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub days: usize,
    pub total_invested: f64,
    pub total_realized_profit: f64,
    pub mean_daily_profit: f64,
    /// 少於兩天時為 0
    pub profit_std_dev: f64,
    /// 損益為正的天數比例
    pub win_rate: f64,
    pub best_day: Option<(NaiveDate, f64)>,
    pub worst_day: Option<(NaiveDate, f64)>,
}

impl BacktestSummary {
    pub fn from_records(records: &[DailyRecord]) -> Self {
        let profits: Vec<f64> = records.iter().map(|r| r.realized_profit).collect();
        let days = profits.len();

        if days == 0 {
            return Self {
                days: 0,
                total_invested: 0.0,
                total_realized_profit: 0.0,
                mean_daily_profit: 0.0,
                profit_std_dev: 0.0,
                win_rate: 0.0,
                best_day: None,
                worst_day: None,
            };
        }

        let wins = profits.iter().filter(|&&p| p > 0.0).count();
        let by_profit = |a: &&DailyRecord, b: &&DailyRecord| a.realized_profit.total_cmp(&b.realized_profit);

        Self {
            days,
            total_invested: records.iter().map(|r| r.total_invested).sum(),
            total_realized_profit: profits.iter().sum(),
            mean_daily_profit: profits.iter().mean(),
            profit_std_dev: if days >= 2 { profits.iter().std_dev() } else { 0.0 },
            win_rate: wins as f64 / days as f64,
            best_day: records.iter().max_by(by_profit).map(|r| (r.date, r.realized_profit)),
            worst_day: records.iter().min_by(by_profit).map(|r| (r.date, r.realized_profit)),
        }
    }
}

impl fmt::Display for BacktestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "回測天數:       {}", self.days)?;
        writeln!(f, "總投入金額:     {:.2}", self.total_invested)?;
        writeln!(f, "總已實現損益:   {:.2}", self.total_realized_profit)?;
        writeln!(f, "日均損益:       {:.2}", self.mean_daily_profit)?;
        writeln!(f, "損益標準差:     {:.2}", self.profit_std_dev)?;
        writeln!(f, "勝率:           {:.1}%", self.win_rate * 100.0)?;
        if let Some((date, profit)) = self.best_day {
            writeln!(f, "最佳交易日:     {} ({:.2})", date, profit)?;
        }
        if let Some((date, profit)) = self.worst_day {
            writeln!(f, "最差交易日:     {} ({:.2})", date, profit)?;
        }
        Ok(())
    }
}
