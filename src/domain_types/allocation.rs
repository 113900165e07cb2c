use serde::{Deserialize, Serialize};

/// 分配計劃中的一行
///
/// `quantity` 允許小數股；`invested = quantity * price`，
/// `expected_profit = invested * predicted_return`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub symbol: String,
    pub price: f64,
    pub predicted_return: f64,
    pub quantity: f64,
    pub invested: f64,
    pub expected_profit: f64,
}

impl AllocationLine {
    pub fn new(symbol: impl Into<String>, price: f64, predicted_return: f64, quantity: f64) -> Self {
        let invested = quantity * price;
        Self {
            symbol: symbol.into(),
            price,
            predicted_return,
            quantity,
            invested,
            expected_profit: invested * predicted_return,
        }
    }

    /// 以實際收盤價計算的已實現損益
    pub fn realized_profit(&self, close: f64) -> f64 {
        (close - self.price) * self.quantity
    }
}

/// 分配計劃的總投入金額
pub fn total_invested(lines: &[AllocationLine]) -> f64 {
    lines.iter().map(|line| line.invested).sum()
}
