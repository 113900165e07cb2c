//! 回測系統模組
//!
//! 從起始日逐個交易日向前回溯：以先前的數據預測、以當日開盤價分配預算、以收盤價結算。
//! 單日的任何失敗只會讓該日被跳過，不會中止整個回測。

pub mod engine;
pub mod error;
pub mod metrics;
pub mod results;

// 重新導出主要類型和結構
pub use engine::{run_backtest, Backtester};
pub use error::{BacktestError, DayError};
pub use metrics::BacktestMetrics;
pub use results::{BacktestRun, SkipReason, SkippedDay};

// 重新導出回測配置
pub use crate::config::BacktestConfig;
