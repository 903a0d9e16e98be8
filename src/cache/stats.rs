//! 缓存统计模块
//!
//! 提供缓存性能统计和信息收集功能

use serde::{Deserialize, Serialize};

/// 缓存性能计数（缓存内部持锁更新）
#[derive(Debug, Clone, Default)]
pub struct CachePerformanceStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 缓存写入次数
    pub writes: u64,
    /// 被存储层按容量淘汰的条目数（查询该键时才会发现）
    pub evictions: u64,
    /// 因过期被清理的条目数
    pub expirations: u64,
}

impl CachePerformanceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 缓存命中率
    pub hit_rate: f64,
    /// 当前缓存条目数
    pub entries: usize,
    /// 缓存写入次数
    pub writes: u64,
    /// 被存储层按容量淘汰的条目数（查询该键时才会发现）
    pub evictions: u64,
    /// 因过期被清理的条目数
    pub expirations: u64,
}

impl CacheStats {
    pub(crate) fn from_perf(perf: &CachePerformanceStats, entries: usize) -> Self {
        Self {
            hits: perf.hits,
            misses: perf.misses,
            hit_rate: perf.hit_rate(),
            entries,
            writes: perf.writes,
            evictions: perf.evictions,
            expirations: perf.expirations,
        }
    }
}
