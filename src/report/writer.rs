use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::domain_types::DailyResult;

/// 報告錯誤類型
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("檔案讀寫錯誤: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV 錯誤: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON 錯誤: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("不支援的報告格式: {0}")]
    UnsupportedFormat(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// 報告輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    JsonLines,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json_lines" | "json-lines" | "jsonl" | "json" => Ok(ReportFormat::JsonLines),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl ReportFormat {
    /// 依副檔名推斷格式
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Invested")]
    pub invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Invested")]
    pub invested: f64,
    #[serde(rename = "Realized Profit")]
    pub realized_profit: f64,
}

/// 每日一筆的持久化記錄，金額四捨五入到兩位小數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Top Stocks")]
    pub top_stocks: Vec<String>,
    #[serde(rename = "Investments")]
    pub investments: Vec<InvestmentRecord>,
    #[serde(rename = "Profits")]
    pub profits: Vec<ProfitRecord>,
    #[serde(rename = "Total Invested")]
    pub total_invested: f64,
    #[serde(rename = "Realized Profit")]
    pub realized_profit: f64,
}

impl From<&DailyResult> for DailyRecord {
    fn from(result: &DailyResult) -> Self {
        Self {
            date: result.date(),
            top_stocks: result.top_symbols().to_vec(),
            investments: result
                .allocations()
                .iter()
                .map(|line| InvestmentRecord {
                    symbol: line.symbol.clone(),
                    invested: round2(line.invested),
                })
                .collect(),
            profits: result
                .outcomes()
                .iter()
                .map(|outcome| ProfitRecord {
                    symbol: outcome.symbol.clone(),
                    invested: round2(outcome.invested),
                    realized_profit: round2(outcome.realized_profit),
                })
                .collect(),
            total_invested: round2(result.total_invested()),
            realized_profit: round2(result.realized_profit()),
        }
    }
}

/// CSV 無法表達巢狀欄位，列表欄位以 JSON 字串保存
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Top Stocks")]
    top_stocks: String,
    #[serde(rename = "Investments")]
    investments: String,
    #[serde(rename = "Profits")]
    profits: String,
    #[serde(rename = "Total Invested")]
    total_invested: f64,
    #[serde(rename = "Realized Profit")]
    realized_profit: f64,
}

impl CsvRow {
    fn from_record(record: &DailyRecord) -> ReportResult<Self> {
        Ok(Self {
            date: record.date,
            top_stocks: serde_json::to_string(&record.top_stocks)?,
            investments: serde_json::to_string(&record.investments)?,
            profits: serde_json::to_string(&record.profits)?,
            total_invested: record.total_invested,
            realized_profit: record.realized_profit,
        })
    }

    fn into_record(self) -> ReportResult<DailyRecord> {
        Ok(DailyRecord {
            date: self.date,
            top_stocks: serde_json::from_str(&self.top_stocks)?,
            investments: serde_json::from_str(&self.investments)?,
            profits: serde_json::from_str(&self.profits)?,
            total_invested: self.total_invested,
            realized_profit: self.realized_profit,
        })
    }
}

pub fn write_json_lines<W: Write>(writer: W, records: &[DailyRecord]) -> ReportResult<()> {
    let mut writer = BufWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_json_lines<R: BufRead>(reader: R) -> ReportResult<Vec<DailyRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

pub fn write_csv<W: Write>(writer: W, records: &[DailyRecord]) -> ReportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(CsvRow::from_record(record)?)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> ReportResult<Vec<DailyRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    reader
        .deserialize::<CsvRow>()
        .map(|row| row?.into_record())
        .collect()
}

/// 將回測結果寫入文件，必要時建立上層目錄，返回寫入的記錄數
pub fn write_report(path: &Path, results: &[DailyResult], format: ReportFormat) -> ReportResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let records: Vec<DailyRecord> = results.iter().map(DailyRecord::from).collect();
    let file = File::create(path)?;
    match format {
        ReportFormat::JsonLines => write_json_lines(file, &records)?,
        ReportFormat::Csv => write_csv(file, &records)?,
    }

    info!(path = %path.display(), records = records.len(), ?format, "已保存回測結果");
    Ok(records.len())
}

/// 讀取先前保存的報告
pub fn read_report(path: &Path, format: ReportFormat) -> ReportResult<Vec<DailyRecord>> {
    let file = File::open(path)?;
    match format {
        ReportFormat::JsonLines => read_json_lines(BufReader::new(file)),
        ReportFormat::Csv => read_csv(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_types::AllocationLine;
    use std::collections::HashMap;

    fn sample_result() -> DailyResult {
        let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let allocations = vec![AllocationLine::new("TCS.NS", 3845.0, 0.015, 0.52)];
        let closes = HashMap::from([("TCS.NS".to_string(), 3900.0)]);
        DailyResult::settle(date, vec!["TCS.NS".into(), "INFY.NS".into()], allocations, &closes)
    }

    #[test]
    fn test_record_uses_persisted_column_names() {
        let record = DailyRecord::from(&sample_result());
        let json = serde_json::to_value(&record).unwrap();

        for key in ["Date", "Top Stocks", "Investments", "Profits", "Total Invested", "Realized Profit"] {
            assert!(json.get(key).is_some(), "缺少欄位 {}", key);
        }
        assert_eq!(json["Date"], "2025-06-09");
        assert_eq!(json["Investments"][0]["Symbol"], "TCS.NS");
    }

    #[test]
    fn test_amounts_are_rounded() {
        let record = DailyRecord::from(&sample_result());
        // 3845 * 0.52 = 1999.4, (3900 - 3845) * 0.52 = 28.6
        assert_eq!(record.total_invested, 1999.4);
        assert_eq!(record.realized_profit, 28.6);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("jsonl".parse::<ReportFormat>().unwrap(), ReportFormat::JsonLines);
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert!("parquet".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::from_path(Path::new("out/results.csv")), Some(ReportFormat::Csv));
        assert_eq!(ReportFormat::from_path(Path::new("out/results")), None);
    }

    #[test]
    fn test_csv_keeps_nested_columns() {
        let records = vec![DailyRecord::from(&sample_result())];
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &records).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Date,Top Stocks,Investments,Profits,Total Invested,Realized Profit"));

        let loaded = read_csv(buffer.as_slice()).unwrap();
        assert_eq!(loaded, records);
    }
}
