use thiserror::Error;

use crate::forecast::ForecastError;

/// 回測錯誤類型，只在回測開始前返回
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("回測配置錯誤: {0}")]
    Configuration(String),
}

/// 單日處理錯誤，會被捕獲並記錄為跳過的交易日
#[derive(Error, Debug)]
pub enum DayError {
    #[error("預測失敗: {0}")]
    Forecast(#[from] ForecastError),

    #[error("處理過程發生 panic: {0}")]
    Panicked(String),
}
