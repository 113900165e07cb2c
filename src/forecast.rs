//! 預測模組
//!
//! 回測只依賴 [`Forecaster`] 特性：給定標的池與訓練窗口，返回按預測報酬排序的候選。
//! [`MeanReturnForecaster`] 是可替換的預設實現。

pub mod mean_return;
pub mod predictor;

pub use mean_return::MeanReturnForecaster;
pub use predictor::{rank_top_n, ForecastError, Forecaster};
