//! 基於 CSV 文件的市場數據源
//!
//! 每個標的一個 `<SYMBOL>.csv`，欄位為 Yahoo 風格的 `Date,Open,High,Low,Close,Volume`，
//! 欄位名稱不區分大小寫，`High`、`Low`、`Volume` 可以缺少。

use chrono::NaiveDate;
use csv::StringRecord;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MarketDataConfig;
use crate::data_provider::cache::BarCache;
use crate::data_provider::loader::MarketDataSource;
use crate::domain_types::{DailyBar, QuoteTable};
use crate::utils::parse_date;

/// CSV 數據源錯誤類型
#[derive(Error, Debug)]
pub enum QuoteSourceError {
    #[error("檔案讀取錯誤: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV 解析錯誤: {0}")]
    ParseError(#[from] csv::Error),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("找不到數據文件: {0}")]
    NotFound(PathBuf),
}

/// CSV 處理結果類型
pub type QuoteSourceResult<T> = Result<T, QuoteSourceError>;

/// 欄位位置
struct ColumnIndex {
    date: usize,
    open: usize,
    close: usize,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> QuoteSourceResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| find(name).ok_or_else(|| QuoteSourceError::MissingColumn(name.to_string()));

        Ok(Self {
            date: require("Date")?,
            open: require("Open")?,
            close: require("Close")?,
            high: find("High"),
            low: find("Low"),
            volume: find("Volume"),
        })
    }

    fn parse_row(&self, record: &StringRecord) -> Option<DailyBar> {
        // 時間戳格式如 "2025-06-02 00:00:00+05:30" 只取日期部分
        let date_field = record.get(self.date)?.trim();
        let date = parse_date(date_field.get(..10).unwrap_or(date_field)).ok()?;
        let open = parse_number(record.get(self.open))?;
        let close = parse_number(record.get(self.close))?;
        let optional = |idx: Option<usize>| idx.and_then(|i| parse_number(record.get(i)));

        Some(DailyBar {
            date,
            open,
            high: optional(self.high),
            low: optional(self.low),
            close,
            volume: optional(self.volume),
        })
    }
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    let value: f64 = field?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// CSV 數據源，已解析的文件保存在 LRU 快取中
pub struct CsvMarketDataSource {
    directory: PathBuf,
    cache: BarCache,
}

impl CsvMarketDataSource {
    pub fn new(directory: impl Into<PathBuf>, cache_capacity: usize) -> Self {
        Self {
            directory: directory.into(),
            cache: BarCache::new(cache_capacity),
        }
    }

    pub fn from_config(config: &MarketDataConfig) -> Self {
        Self::new(config.directory_path(), config.cache_capacity)
    }

    /// 標的對應的數據文件路徑
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", symbol))
    }

    /// 加載標的的全部數據，優先讀取快取
    pub fn load_symbol(&self, symbol: &str) -> QuoteSourceResult<Arc<Vec<DailyBar>>> {
        if let Some(bars) = self.cache.get(symbol) {
            return Ok(bars);
        }

        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(QuoteSourceError::NotFound(path));
        }

        let file = std::fs::File::open(&path)?;
        let bars = Self::parse_reader(file)?;
        debug!(symbol, rows = bars.len(), path = %path.display(), "已加載 CSV 數據");
        Ok(self.cache.insert(symbol, bars))
    }

    /// 解析 CSV 內容，格式錯誤的資料行會被略過
    pub fn parse_reader<R: Read>(reader: R) -> QuoteSourceResult<Vec<DailyBar>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for record in csv_reader.records() {
            match columns.parse_row(&record?) {
                Some(bar) => bars.push(bar),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "略過格式錯誤的資料行");
        }

        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}

impl MarketDataSource for CsvMarketDataSource {
    fn fetch_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> QuoteTable {
        match self.load_symbol(symbol) {
            Ok(bars) => {
                let rows = bars
                    .iter()
                    .filter(|bar| bar.date >= start && bar.date <= end)
                    .copied()
                    .collect();
                QuoteTable::new(symbol, rows)
            }
            Err(QuoteSourceError::NotFound(path)) => {
                debug!(symbol, path = %path.display(), "沒有此標的的數據文件");
                QuoteTable::empty(symbol)
            }
            Err(e) => {
                warn!(symbol, %start, %end, "無法讀取報價數據: {}", e);
                QuoteTable::empty(symbol)
            }
        }
    }
}
