// 模組定義
pub mod allocation;
pub mod backtest;
pub mod config;
pub mod data_provider;
pub mod domain_types;
pub mod forecast;
pub mod report;
pub mod utils;

pub use allocation::{allocate, Allocator};
pub use backtest::{run_backtest, Backtester, BacktestRun};
