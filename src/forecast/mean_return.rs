use chrono::NaiveDate;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ForecastConfig;
use crate::data_provider::MarketDataSource;
use crate::domain_types::Candidate;
use crate::forecast::predictor::{rank_top_n, ForecastError, Forecaster};

/// 以近期平均日內報酬作為下一期報酬估計的基準預測器
///
/// 訓練窗口內少於 `min_history_rows` 行的標的會被略過；
/// 其餘標的以最近 `lookback_rows` 行 `(close - open) / open` 的平均值評分。
/// 各標的的評分在 rayon 執行緒池中並行計算，結果再做確定性排序。
pub struct MeanReturnForecaster {
    market_data: Arc<dyn MarketDataSource>,
    min_history_rows: usize,
    lookback_rows: usize,
}

impl MeanReturnForecaster {
    pub fn new(market_data: Arc<dyn MarketDataSource>) -> Self {
        Self::with_config(market_data, &ForecastConfig::default())
    }

    pub fn with_config(market_data: Arc<dyn MarketDataSource>, config: &ForecastConfig) -> Self {
        Self {
            market_data,
            min_history_rows: config.min_history_rows.max(1),
            lookback_rows: config.lookback_rows.max(1),
        }
    }

    /// 單一標的的評分，數據不足時返回 `None`
    fn score(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<f64> {
        let table = self.market_data.fetch_quotes(symbol, start, end);
        if table.len() < self.min_history_rows {
            debug!(symbol, rows = table.len(), required = self.min_history_rows, "歷史數據不足，略過");
            return None;
        }

        let returns: Vec<f64> = table
            .tail(self.lookback_rows)
            .iter()
            .filter_map(|bar| bar.intraday_return())
            .collect();

        if returns.is_empty() {
            debug!(symbol, "最近數據沒有可用價格，略過");
            return None;
        }

        let mean = returns.iter().mean();
        mean.is_finite().then_some(mean)
    }
}

impl Forecaster for MeanReturnForecaster {
    fn predict_top_n(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        n: usize,
    ) -> Result<Vec<Candidate>, ForecastError> {
        if start > end {
            return Err(ForecastError::Computation(format!(
                "訓練窗口無效: {} > {}",
                start, end
            )));
        }

        // par_iter + collect 保持輸入順序
        let predictions: Vec<Candidate> = symbols
            .par_iter()
            .filter_map(|symbol| {
                self.score(symbol, start, end)
                    .map(|score| Candidate::new(symbol.clone(), score))
            })
            .collect();

        info!(
            scored = predictions.len(),
            universe = symbols.len(),
            %start,
            %end,
            "預測完成"
        );

        Ok(rank_top_n(predictions, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_provider::InMemoryMarketDataSource;
    use crate::domain_types::DailyBar;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    /// 連續 `rows` 天、每日日內報酬固定為 `ret` 的數據
    fn steady(rows: i64, ret: f64) -> Vec<DailyBar> {
        (0..rows)
            .map(|i| DailyBar::new(start() + Duration::days(i), 100.0, 100.0 * (1.0 + ret)))
            .collect()
    }

    fn forecaster(source: InMemoryMarketDataSource) -> MeanReturnForecaster {
        MeanReturnForecaster::new(Arc::new(source))
    }

    #[test]
    fn test_ranks_by_mean_intraday_return() {
        let source = InMemoryMarketDataSource::new()
            .with_bars("LOW", steady(20, 0.001))
            .with_bars("HIGH", steady(20, 0.02))
            .with_bars("NEG", steady(20, -0.01));
        let symbols = vec!["LOW".to_string(), "HIGH".to_string(), "NEG".to_string()];

        let ranked = forecaster(source)
            .predict_top_n(&symbols, start(), start() + Duration::days(40), 2)
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].symbol, "HIGH");
        assert!((ranked[0].predicted_return - 0.02).abs() < 1e-9);
        assert_eq!(ranked[1].symbol, "LOW");
    }

    #[test]
    fn test_short_history_is_skipped() {
        let source = InMemoryMarketDataSource::new()
            .with_bars("SHORT", steady(10, 0.05))
            .with_bars("LONG", steady(15, 0.01));
        let symbols = vec!["SHORT".to_string(), "LONG".to_string(), "MISSING".to_string()];

        let ranked = forecaster(source)
            .predict_top_n(&symbols, start(), start() + Duration::days(40), 5)
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].symbol, "LONG");
    }

    #[test]
    fn test_uses_only_lookback_rows() {
        // 前 13 天報酬為 0，最後 7 天為 1%
        let mut bars = steady(13, 0.0);
        bars.extend(
            (13..20).map(|i| DailyBar::new(start() + Duration::days(i), 100.0, 101.0)),
        );
        let source = InMemoryMarketDataSource::new().with_bars("A", bars);

        let ranked = forecaster(source)
            .predict_top_n(&["A".to_string()], start(), start() + Duration::days(40), 5)
            .unwrap();

        assert!((ranked[0].predicted_return - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_window_is_error() {
        let result = forecaster(InMemoryMarketDataSource::new()).predict_top_n(
            &["A".to_string()],
            start(),
            start() - Duration::days(1),
            5,
        );
        assert!(result.is_err());
    }
}
