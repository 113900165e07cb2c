use lru::LruCache;
use metrics::counter;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::domain_types::DailyBar;

/// 監控指標命名空間
pub const METRIC_NAMESPACE: &str = "whisper_bar_cache";

/// 快取監控指標記錄器
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        counter!(format!("{}.hit", METRIC_NAMESPACE)).increment(1);
    }

    pub fn record_miss() {
        counter!(format!("{}.miss", METRIC_NAMESPACE)).increment(1);
    }

    pub fn record_insert(rows: usize) {
        counter!(format!("{}.insert", METRIC_NAMESPACE)).increment(1);
        counter!(format!("{}.inserted_rows", METRIC_NAMESPACE)).increment(rows as u64);
    }
}

/// 已解析日線數據的 LRU 內存快取
///
/// 回測會對同一標的反覆查詢重疊的日期區間，快取整份解析結果以避免重複讀檔。
pub struct BarCache {
    entries: Mutex<LruCache<String, Arc<Vec<DailyBar>>>>,
}

impl BarCache {
    /// `capacity` 為 0 時視為 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<Vec<DailyBar>>> {
        let hit = self.entries.lock().get(symbol).cloned();
        match hit {
            Some(_) => CacheMetrics::record_hit(),
            None => CacheMetrics::record_miss(),
        }
        hit
    }

    pub fn insert(&self, symbol: &str, bars: Vec<DailyBar>) -> Arc<Vec<DailyBar>> {
        CacheMetrics::record_insert(bars.len());
        let bars = Arc::new(bars);
        self.entries.lock().put(symbol.to_string(), Arc::clone(&bars));
        bars
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
