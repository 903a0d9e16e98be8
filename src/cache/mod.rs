//! 缓存管理模块
//!
//! 基于 rat_memcache 为只读查询提供有界、带 TTL 的结果缓存。
//! 写操作永远不会进入缓存，是否可缓存由调用方通过 `execute_cached` 显式声明。

pub mod key_generator;
pub mod result_cache;
pub mod stats;

// 重新导出主要的公共类型和结构体
pub use key_generator::{CACHE_KEY_PREFIX, QueryFingerprint};
pub use result_cache::ResultCache;
pub use stats::{CachePerformanceStats, CacheStats};
