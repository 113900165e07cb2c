pub mod cache;
pub mod csv_source;
pub mod loader;

pub use cache::{BarCache, CacheMetrics};
pub use csv_source::{CsvMarketDataSource, QuoteSourceError};
pub use loader::{InMemoryMarketDataSource, MarketDataSource};
