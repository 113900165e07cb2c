//! 回測報告模組
//!
//! 將每日結果輸出為表格記錄（JSON lines 或 CSV），並計算彙總統計與累積損益序列。

pub mod summary;
pub mod writer;

pub use summary::{cumulative_profit, BacktestSummary, CumulativePoint};
pub use writer::{
    read_report, write_report, DailyRecord, InvestmentRecord, ProfitRecord, ReportError,
    ReportFormat,
};
