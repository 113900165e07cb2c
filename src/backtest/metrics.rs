use metrics::{counter, histogram};
use std::time::Duration;

use crate::backtest::results::SkipReason;

/// 監控指標命名空間
pub const METRIC_NAMESPACE: &str = "whisper_backtest";

/// 回測監控指標記錄器
pub struct BacktestMetrics;

impl BacktestMetrics {
    pub fn record_attempt() {
        counter!(format!("{}.days_attempted", METRIC_NAMESPACE)).increment(1);
    }

    pub fn record_completed(realized_profit: f64) {
        counter!(format!("{}.days_completed", METRIC_NAMESPACE)).increment(1);
        histogram!(format!("{}.daily_realized_profit", METRIC_NAMESPACE)).record(realized_profit);
    }

    pub fn record_skip(reason: &SkipReason) {
        counter!(
            format!("{}.days_skipped", METRIC_NAMESPACE),
            "reason" => reason.as_label()
        )
        .increment(1);
    }

    pub fn record_run_duration(duration: Duration) {
        histogram!(format!("{}.run_duration_ms", METRIC_NAMESPACE)).record(duration.as_millis() as f64);
    }
}
