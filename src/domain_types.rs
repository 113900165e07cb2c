pub mod allocation;
pub mod candidate;
pub mod daily_result;
pub mod data_point;
pub mod time_series;

pub use allocation::{total_invested, AllocationLine};
pub use candidate::Candidate;
pub use daily_result::{DailyResult, PositionOutcome};
pub use data_point::{DailyBar, PriceQuote};
pub use time_series::QuoteTable;
