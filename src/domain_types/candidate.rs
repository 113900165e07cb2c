use serde::{Deserialize, Serialize};

/// 預測器輸出的候選標的
///
/// `predicted_return` 為小數形式的下一期變動估計（0.012 即 +1.2%），正負皆可。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub predicted_return: f64,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, predicted_return: f64) -> Self {
        Self {
            symbol: symbol.into(),
            predicted_return,
        }
    }
}

impl From<(&str, f64)> for Candidate {
    fn from((symbol, predicted_return): (&str, f64)) -> Self {
        Self::new(symbol, predicted_return)
    }
}

impl From<(String, f64)> for Candidate {
    fn from((symbol, predicted_return): (String, f64)) -> Self {
        Self::new(symbol, predicted_return)
    }
}
