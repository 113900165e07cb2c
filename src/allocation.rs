//! 預算分配模組
//!
//! 將一組已排序的候選標的依預測報酬分配到固定預算上。
//! 採用上限策略：單一標的最多獲得原始預算的 `1 / max_positions`，並允許小數股。

pub mod allocator;

pub use allocator::{allocate, Allocator, DEFAULT_MAX_POSITIONS};
