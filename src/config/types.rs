use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::config::validation::{ValidationError, ValidationUtils, Validator};

/// 應用程序配置結構
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub log: LogConfig,
    pub backtest: BacktestConfig,
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證各個部分的配置
        self.log.validate()?;
        self.backtest.validate()?;
        self.market_data.validate()?;
        self.forecast.validate()?;
        self.report.validate()?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
    /// 設定時額外寫入按日滾動的日誌文件
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_log_file_prefix() -> String {
    "stock_whisper.log".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證日誌級別
        ValidationUtils::one_of(&self.level, &["trace", "debug", "info", "warn", "error"], "log.level")?;

        // 驗證日誌格式
        ValidationUtils::one_of(&self.format, &["pretty", "json"], "log.format")?;

        if let Some(directory) = &self.directory {
            ValidationUtils::not_blank(directory, "log.directory")?;
            ValidationUtils::not_blank(&self.file_prefix, "log.file_prefix")?;
        }

        Ok(())
    }
}

/// 回測配置
///
/// 每個模擬交易日都以完整的 `budget` 開始，預算不會跨日結轉。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// 每日投資預算
    pub budget: f64,
    /// 嘗試回測的交易日數（含被跳過的日子）
    pub num_days: usize,
    /// 每日向預測器索取的候選數量
    pub top_n: usize,
    /// 訓練窗口長度（日曆日）
    pub training_window_days: i64,
    /// 單一標的最多獲得 `budget / max_positions`
    pub max_positions: usize,
    /// 預設標的池，命令列未指定時使用
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            budget: 10_000.0,
            num_days: 10,
            top_n: 5,
            training_window_days: 60,
            max_positions: 5,
            symbols: Vec::new(),
        }
    }
}

impl Validator for BacktestConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::positive_amount(self.budget, "backtest.budget")?;
        ValidationUtils::in_range(self.num_days, 1, 10_000, "backtest.num_days")?;
        ValidationUtils::in_range(self.top_n, 1, 500, "backtest.top_n")?;
        ValidationUtils::in_range(
            self.training_window_days,
            1,
            3650,
            "backtest.training_window_days",
        )?;
        ValidationUtils::in_range(self.max_positions, 1, 500, "backtest.max_positions")?;
        ValidationUtils::symbol_universe(&self.symbols, "backtest.symbols")?;

        Ok(())
    }
}

/// 市場數據配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// 存放 `<SYMBOL>.csv` 的目錄
    pub directory: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    64
}

impl MarketDataConfig {
    /// 數據目錄路徑
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

impl Validator for MarketDataConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_blank(&self.directory, "market_data.directory")?;
        ValidationUtils::in_range(self.cache_capacity, 1, 100_000, "market_data.cache_capacity")?;

        Ok(())
    }
}

/// 基準預測器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// 訓練窗口內至少需要的數據行數
    pub min_history_rows: usize,
    /// 用於計算平均日內報酬的最近行數
    pub lookback_rows: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_history_rows: 15,
            lookback_rows: 7,
        }
    }
}

impl Validator for ForecastConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(self.min_history_rows, 1, 10_000, "forecast.min_history_rows")?;
        ValidationUtils::in_range(self.lookback_rows, 1, self.min_history_rows, "forecast.lookback_rows")?;

        Ok(())
    }
}

/// 回測報告配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    /// `json_lines` 或 `csv`
    pub format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "data/evaluation_results.json".to_string(),
            format: "json_lines".to_string(),
        }
    }
}

impl Validator for ReportConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_blank(&self.output_path, "report.output_path")?;
        ValidationUtils::one_of(&self.format, &["json_lines", "csv"], "report.format")?;

        Ok(())
    }
}
