use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::domain_types::{AllocationLine, Candidate};

/// 預設持倉上限，即每檔最多 1/5 預算
pub const DEFAULT_MAX_POSITIONS: usize = 5;

/// 上限策略的貪婪分配器
///
/// 1. 過濾出具有有限正價格、且預測報酬為有限數值的候選
/// 2. 依 `predicted_return` 遞減做穩定排序，同分保持輸入順序
/// 3. 每檔上限為 `min(budget / max_positions, remaining_budget)`，
///    以小數股買入 `cap / price` 股
/// 4. 價格高於上限（連一股都買不起）的標的被跳過，繼續走訪下一檔
/// 5. 同一標的在候選中重複出現時只考慮排序後的第一筆，單一標的的總投入不超過上限
///
/// 未用完的預算不會再分配給已選中的標的。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocator {
    max_positions: usize,
}

impl Default for Allocator {
    fn default() -> Self {
        Self {
            max_positions: DEFAULT_MAX_POSITIONS,
        }
    }
}

impl Allocator {
    /// `max_positions` 為 0 時視為 1
    pub fn new(max_positions: usize) -> Self {
        Self {
            max_positions: max_positions.max(1),
        }
    }

    pub fn max_positions(&self) -> usize {
        self.max_positions
    }

    /// 單一標的可獲得的最大金額
    pub fn per_symbol_cap(&self, budget: f64) -> f64 {
        budget / self.max_positions as f64
    }

    /// 產生分配計劃，按處理順序（預測報酬遞減）返回
    ///
    /// 純函數：相同輸入永遠得到相同輸出。沒有可用候選或 `budget <= 0` 時返回空列表。
    pub fn allocate(
        &self,
        candidates: &[Candidate],
        prices: &HashMap<String, f64>,
        budget: f64,
    ) -> Vec<AllocationLine> {
        if !budget.is_finite() || budget <= 0.0 {
            debug!(budget, "預算無效，不產生分配");
            return Vec::new();
        }

        let mut ranked: Vec<(&Candidate, f64)> = candidates
            .iter()
            .filter(|candidate| candidate.predicted_return.is_finite())
            .filter_map(|candidate| match prices.get(&candidate.symbol) {
                Some(&price) if price.is_finite() && price > 0.0 => Some((candidate, price)),
                _ => {
                    trace!(symbol = %candidate.symbol, "缺少可用價格，略過");
                    None
                }
            })
            .collect();

        // sort_by 是穩定排序
        ranked.sort_by(|(a, _), (b, _)| b.predicted_return.total_cmp(&a.predicted_return));

        let mut seen = HashSet::with_capacity(ranked.len());
        ranked.retain(|&(candidate, _)| {
            let first = seen.insert(candidate.symbol.as_str());
            if !first {
                trace!(symbol = %candidate.symbol, "重複的候選，略過");
            }
            first
        });

        let max_per_symbol = self.per_symbol_cap(budget);
        let mut remaining_budget = budget;
        let mut lines = Vec::with_capacity(ranked.len().min(self.max_positions));

        for (candidate, price) in ranked {
            if remaining_budget <= 0.0 {
                break;
            }

            let cap = max_per_symbol.min(remaining_budget);
            if price > cap {
                trace!(symbol = %candidate.symbol, price, cap, "價格超過上限，略過");
                continue;
            }

            let quantity = cap / price;
            let line = AllocationLine::new(
                candidate.symbol.clone(),
                price,
                candidate.predicted_return,
                quantity,
            );
            remaining_budget -= line.invested;
            lines.push(line);
        }

        debug!(
            lines = lines.len(),
            unspent = remaining_budget.max(0.0),
            "分配完成"
        );
        lines
    }
}

/// 以預設上限策略分配預算
pub fn allocate(
    candidates: &[Candidate],
    prices: &HashMap<String, f64>,
    budget: f64,
) -> Vec<AllocationLine> {
    Allocator::default().allocate(candidates, prices, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn candidates(entries: &[(&str, f64)]) -> Vec<Candidate> {
        entries.iter().map(|&(s, r)| Candidate::new(s, r)).collect()
    }

    #[test]
    fn test_two_candidates_each_capped_at_one_fifth() {
        let lines = allocate(
            &candidates(&[("A", 0.02), ("B", 0.01)]),
            &prices(&[("A", 100.0), ("B", 50.0)]),
            1000.0,
        );

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].symbol, "A");
        assert!((lines[0].quantity - 2.0).abs() < 1e-12);
        assert!((lines[0].invested - 200.0).abs() < 1e-9);
        assert!((lines[0].expected_profit - 4.0).abs() < 1e-9);
        assert_eq!(lines[1].symbol, "B");
        assert!((lines[1].quantity - 4.0).abs() < 1e-12);
        assert!((lines[1].expected_profit - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_and_missing_prices_are_skipped() {
        let lines = allocate(
            &candidates(&[("A", 0.05), ("B", 0.04), ("C", 0.03)]),
            &prices(&[("A", 0.0), ("C", 10.0)]),
            1000.0,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].symbol, "C");
    }

    #[test]
    fn test_non_finite_returns_are_skipped() {
        let lines = allocate(
            &candidates(&[("A", f64::NAN), ("B", 0.01)]),
            &prices(&[("A", 10.0), ("B", 10.0)]),
            1000.0,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].symbol, "B");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let lines = allocate(
            &candidates(&[("B", 0.01), ("A", 0.01), ("C", 0.02)]),
            &prices(&[("A", 10.0), ("B", 10.0), ("C", 10.0)]),
            1000.0,
        );
        let symbols: Vec<&str> = lines.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_custom_max_positions_changes_cap() {
        let allocator = Allocator::new(2);
        assert_eq!(allocator.per_symbol_cap(1000.0), 500.0);

        let lines = allocator.allocate(
            &candidates(&[("A", 0.03), ("B", 0.02), ("C", 0.01)]),
            &prices(&[("A", 100.0), ("B", 100.0), ("C", 100.0)]),
            1000.0,
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(Allocator::new(0).max_positions(), 1);
    }

    #[test]
    fn test_repeated_symbol_funded_once() {
        let lines = allocate(
            &candidates(&[("A", 0.01), ("B", 0.015), ("A", 0.02)]),
            &prices(&[("A", 100.0), ("B", 100.0)]),
            1000.0,
        );
        let symbols: Vec<&str> = lines.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B"]);
        // 保留排序後的第一筆
        assert_eq!(lines[0].predicted_return, 0.02);
        assert!((lines[0].invested - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_budget_yields_empty_plan() {
        let c = candidates(&[("A", 0.02)]);
        let p = prices(&[("A", 10.0)]);
        assert!(allocate(&c, &p, 0.0).is_empty());
        assert!(allocate(&c, &p, -10.0).is_empty());
        assert!(allocate(&c, &p, f64::NAN).is_empty());
    }
}
