// utils.rs - 公共工具模組
//
// 提供各種通用的工具函數和輔助方法，用於簡化系統其他部分的代碼。

pub mod time_utils;

// 重新導出交易日曆函數，使其可以通過 utils::function_name 直接訪問
pub use time_utils::{
    business_days_back,
    format_date,
    is_business_day,
    next_business_day,
    parse_date,
    previous_business_day,
    today,
    training_window,
};
