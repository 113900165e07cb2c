use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

use crate::allocation::Allocator;
use crate::backtest::error::{BacktestError, DayError};
use crate::backtest::metrics::BacktestMetrics;
use crate::backtest::results::{BacktestRun, SkipReason, SkippedDay};
use crate::config::{BacktestConfig, Validator};
use crate::data_provider::MarketDataSource;
use crate::domain_types::{Candidate, DailyResult, PriceQuote};
use crate::forecast::Forecaster;
use crate::utils::{previous_business_day, today, training_window};

/// 單日處理的結果
enum DayOutcome {
    Completed(DailyResult),
    Skipped(SkipReason),
}

/// 滾動窗口回測引擎
///
/// 從 `start_date` 開始，每次迭代後退到前一個交易日，直到嘗試了 `num_days` 天。
/// 每一天：
/// 1. 以 `[test_day - training_window_days, test_day - 1]` 向預測器取得前 `top_n` 個候選
/// 2. 取得各候選當日的開盤與收盤價，缺少報價的候選只在當日被剔除
/// 3. 以開盤價分配預算，以收盤價計算已實現損益
///
/// 日與日之間只共享唯讀的標的池與預算，預算每天重新開始。
pub struct Backtester {
    forecaster: Arc<dyn Forecaster>,
    market_data: Arc<dyn MarketDataSource>,
    allocator: Allocator,
    top_n: usize,
    training_window_days: i64,
    start_date: Option<NaiveDate>,
}

impl Backtester {
    pub fn new(forecaster: Arc<dyn Forecaster>, market_data: Arc<dyn MarketDataSource>) -> Self {
        let defaults = BacktestConfig::default();
        Self {
            forecaster,
            market_data,
            allocator: Allocator::new(defaults.max_positions),
            top_n: defaults.top_n,
            training_window_days: defaults.training_window_days,
            start_date: None,
        }
    }

    /// 驗證並套用配置中的 `top_n`、訓練窗口與持倉上限
    pub fn with_config(mut self, config: &BacktestConfig) -> Result<Self, BacktestError> {
        config
            .validate()
            .map_err(|e| BacktestError::Configuration(e.to_string()))?;

        self.allocator = Allocator::new(config.max_positions);
        self.top_n = config.top_n;
        self.training_window_days = config.training_window_days;
        Ok(self)
    }

    /// 指定起始日，未指定時使用本地時區的今日
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    fn validate(&self, symbols: &[String], budget: f64) -> Result<(), BacktestError> {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(BacktestError::Configuration(format!(
                "預算必須為正數，實際為 {}",
                budget
            )));
        }
        if symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(BacktestError::Configuration("標的池為空".to_string()));
        }
        if self.top_n == 0 {
            return Err(BacktestError::Configuration("top_n 必須大於 0".to_string()));
        }
        if self.training_window_days < 1 {
            return Err(BacktestError::Configuration(format!(
                "訓練窗口必須至少 1 天，實際為 {}",
                self.training_window_days
            )));
        }
        Ok(())
    }

    /// 執行回測
    ///
    /// 配置錯誤在任何迭代開始前返回；之後單日的失敗只會被記錄為跳過。
    /// 標的池中重複的代碼只保留第一次出現。
    pub fn run(
        &self,
        symbols: &[String],
        num_days: usize,
        budget: f64,
    ) -> Result<BacktestRun, BacktestError> {
        self.validate(symbols, budget)?;
        let symbols = unique_symbols(symbols);
        let symbols = symbols.as_slice();

        let started = Instant::now();
        let start_date = self.start_date.unwrap_or_else(today);
        let mut run = BacktestRun::new(start_date, budget);

        let span = info_span!("backtest", run_id = %run.run_id);
        let _guard = span.enter();
        info!(
            %start_date,
            num_days,
            budget,
            universe = symbols.len(),
            "開始回測"
        );

        let mut test_day = start_date;
        while run.days_attempted < num_days {
            debug!(
                day = run.days_attempted + 1,
                num_days,
                %test_day,
                "回測交易日"
            );
            BacktestMetrics::record_attempt();

            match self.process_day(symbols, test_day, budget) {
                Ok(DayOutcome::Completed(result)) => {
                    info!(
                        %test_day,
                        positions = result.allocations().len(),
                        total_invested = result.total_invested(),
                        realized_profit = result.realized_profit(),
                        "交易日完成"
                    );
                    BacktestMetrics::record_completed(result.realized_profit());
                    run.results.push(result);
                }
                Ok(DayOutcome::Skipped(reason)) => {
                    info!(%test_day, %reason, "跳過交易日");
                    BacktestMetrics::record_skip(&reason);
                    run.skipped.push(SkippedDay { date: test_day, reason });
                }
                Err(e) => {
                    error!(%test_day, "交易日處理失敗: {}", e);
                    let reason = SkipReason::Failed(e.to_string());
                    BacktestMetrics::record_skip(&reason);
                    run.skipped.push(SkippedDay { date: test_day, reason });
                }
            }

            run.days_attempted += 1;
            test_day = previous_business_day(test_day);
        }

        let elapsed = started.elapsed();
        BacktestMetrics::record_run_duration(elapsed);
        info!(
            completed = run.results.len(),
            skipped = run.skipped.len(),
            total_realized_profit = run.total_realized_profit(),
            elapsed_ms = elapsed.as_millis() as u64,
            "回測完成"
        );

        Ok(run)
    }

    /// 處理單日，panic 會被轉換為 [`DayError::Panicked`]
    fn process_day(
        &self,
        symbols: &[String],
        test_day: NaiveDate,
        budget: f64,
    ) -> Result<DayOutcome, DayError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.simulate_day(symbols, test_day, budget)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "未知錯誤".to_string());
                Err(DayError::Panicked(message))
            })
    }

    fn simulate_day(
        &self,
        symbols: &[String],
        test_day: NaiveDate,
        budget: f64,
    ) -> Result<DayOutcome, DayError> {
        let (train_start, train_end) = training_window(test_day, self.training_window_days);
        debug!(%train_start, %train_end, "訓練窗口");

        let candidates = self
            .forecaster
            .predict_top_n(symbols, train_start, train_end, self.top_n)?;
        if candidates.is_empty() {
            return Ok(DayOutcome::Skipped(SkipReason::NoPrediction));
        }

        let quotes = self.fetch_quotes(&candidates, test_day);
        if quotes.is_empty() {
            return Ok(DayOutcome::Skipped(SkipReason::NoMarketData));
        }

        let opens: HashMap<String, f64> = quotes
            .iter()
            .map(|quote| (quote.symbol.clone(), quote.open))
            .collect();
        let closes: HashMap<String, f64> = quotes
            .into_iter()
            .map(|quote| (quote.symbol, quote.close))
            .collect();

        let allocations = self.allocator.allocate(&candidates, &opens, budget);
        let top_symbols = candidates.into_iter().map(|c| c.symbol).collect();

        Ok(DayOutcome::Completed(DailyResult::settle(
            test_day,
            top_symbols,
            allocations,
            &closes,
        )))
    }

    /// 候選在測試日的報價，缺少或無效報價的候選當日被剔除
    fn fetch_quotes(&self, candidates: &[Candidate], test_day: NaiveDate) -> Vec<PriceQuote> {
        candidates
            .iter()
            .filter_map(|candidate| match self.market_data.fetch_day(&candidate.symbol, test_day) {
                Some(bar) if bar.has_usable_prices() => {
                    Some(PriceQuote::from_bar(&candidate.symbol, &bar))
                }
                Some(_) => {
                    warn!(symbol = %candidate.symbol, %test_day, "報價無效，當日剔除");
                    None
                }
                None => {
                    debug!(symbol = %candidate.symbol, %test_day, "當日沒有報價，剔除");
                    None
                }
            })
            .collect()
    }
}

/// 保持順序去除重複代碼
fn unique_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(symbols.len());
    let unique: Vec<String> = symbols
        .iter()
        .filter(|&symbol| seen.insert(symbol.as_str()))
        .cloned()
        .collect();
    if unique.len() < symbols.len() {
        warn!(removed = symbols.len() - unique.len(), "標的池含重複代碼，已去除");
    }
    unique
}

/// 以預設配置執行回測
pub fn run_backtest(
    forecaster: Arc<dyn Forecaster>,
    market_data: Arc<dyn MarketDataSource>,
    symbols: &[String],
    num_days: usize,
    budget: f64,
) -> Result<BacktestRun, BacktestError> {
    Backtester::new(forecaster, market_data).run(symbols, num_days, budget)
}
