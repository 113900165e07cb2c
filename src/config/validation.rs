use std::collections::HashSet;
use thiserror::Error;

/// 配置驗證錯誤
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("缺少必要配置項: {0}")]
    MissingField(String),

    #[error("{field} 必須為有限正數，實際為 {value}")]
    NotPositive { field: String, value: f64 },

    #[error("{field} 的值 {value} 不在範圍 {min}..={max} 內")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} 不支援 '{value}'，可選值: {options}")]
    UnknownOption {
        field: String,
        value: String,
        options: String,
    },

    #[error("{field} 中的標的 {symbol} 重複出現")]
    DuplicateSymbol { field: String, symbol: String },
}

/// 配置區段的驗證
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// 各配置區段共用的檢查
pub struct ValidationUtils;

impl ValidationUtils {
    /// 閉區間 `[min, max]` 檢查，用於天數、行數與容量
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + ToString,
    {
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// 金額必須為有限正數，NaN 與無窮大都不接受
    pub fn positive_amount(value: f64, field: &str) -> Result<(), ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// 不分大小寫的選項檢查，例如日誌格式與報告格式
    pub fn one_of(value: &str, options: &[&str], field: &str) -> Result<(), ValidationError> {
        let normalized = value.trim().to_lowercase();
        if options.iter().any(|option| *option == normalized) {
            return Ok(());
        }
        Err(ValidationError::UnknownOption {
            field: field.to_string(),
            value: value.to_string(),
            options: options.join(", "),
        })
    }

    pub fn not_blank(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field.to_string()));
        }
        Ok(())
    }

    /// 標的池不得含空白或重複的代碼，否則同一標的會被重複評分與分配
    pub fn symbol_universe(symbols: &[String], field: &str) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in symbols {
            Self::not_blank(symbol, field)?;
            if !seen.insert(symbol.trim()) {
                return Err(ValidationError::DuplicateSymbol {
                    field: field.to_string(),
                    symbol: symbol.trim().to_string(),
                });
            }
        }
        Ok(())
    }
}
