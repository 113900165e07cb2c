use chrono::NaiveDate;
use thiserror::Error;

use crate::domain_types::Candidate;

/// 預測錯誤類型
///
/// 單一標的的失敗不屬於錯誤，預測器應記錄並略過；只有整次預測無法完成時才返回錯誤。
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("預測器不可用: {0}")]
    Unavailable(String),

    #[error("預測計算失敗: {0}")]
    Computation(String),
}

/// 預測器特性
pub trait Forecaster: Send + Sync {
    /// 以 `[start, end]` 內的數據訓練並返回最多 `n` 個候選，按預測報酬遞減排列
    fn predict_top_n(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        n: usize,
    ) -> Result<Vec<Candidate>, ForecastError>;
}

/// 依預測報酬遞減排序並保留前 `n` 個，同分保持輸入順序
pub fn rank_top_n(mut predictions: Vec<Candidate>, n: usize) -> Vec<Candidate> {
    predictions.retain(|c| c.predicted_return.is_finite());
    predictions.sort_by(|a, b| b.predicted_return.total_cmp(&a.predicted_return));
    predictions.truncate(n);
    predictions
}
