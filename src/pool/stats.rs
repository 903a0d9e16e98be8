//! 连接池统计模块
//!
//! 计数器全部使用原子变量，读取方拿到的是一份快照，不会阻塞写入方

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::types::BackendKind;

/// 指数移动平均的平滑系数
pub const EMA_ALPHA: f64 = 0.1;

/// 效率评分权重
const REUSE_WEIGHT: f64 = 0.4;
const CACHE_WEIGHT: f64 = 0.3;
const UTILIZATION_WEIGHT: f64 = 0.3;

/// 以 f64 位模式存储的原子浮点数
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// 按 EMA 融合一个新样本，第一个样本直接作为初值
    fn update_ema(&self, sample: f64, first: bool) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = if first {
                sample
            } else {
                let old = f64::from_bits(current);
                old + EMA_ALPHA * (sample - old)
            };
            match self.0.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// 连接池运行统计
#[derive(Debug, Default)]
pub struct PoolStatistics {
    total_connections_created: AtomicU64,
    total_requests: AtomicU64,
    total_releases: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    failed_connections: AtomicU64,
    evicted_connections: AtomicU64,
    timeouts: AtomicU64,
    query_errors: AtomicU64,
    active_count: AtomicUsize,
    idle_count: AtomicUsize,
    peak_active_count: AtomicUsize,
    avg_wait_time_ms: AtomicF64,
    reuse_rate: AtomicF64,
}

impl PoolStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_created(&self) {
        self.total_connections_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_create_failed(&self) {
        self.failed_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次成功的借出
    pub(crate) fn record_acquire(&self, wait: Duration, reused: bool) {
        let previous = self.total_requests.fetch_add(1, Ordering::Relaxed);
        let first = previous == 0;
        self.avg_wait_time_ms
            .update_ema(wait.as_secs_f64() * 1000.0, first);
        self.reuse_rate
            .update_ema(if reused { 1.0 } else { 0.0 }, first);
    }

    pub(crate) fn record_release(&self) {
        self.total_releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evicted_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_error(&self) {
        self.query_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// 更新活跃/空闲连接数，由连接池在持锁状态下调用
    pub(crate) fn set_gauges(&self, active: usize, idle: usize) {
        self.active_count.store(active, Ordering::Relaxed);
        self.idle_count.store(idle, Ordering::Relaxed);
        self.peak_active_count.fetch_max(active, Ordering::Relaxed);
    }

    /// 生成统计快照
    pub fn snapshot(
        &self,
        target: &str,
        backend: Option<BackendKind>,
        max_size: usize,
    ) -> PoolStatsSnapshot {
        let active_count = self.active_count.load(Ordering::Relaxed);
        let idle_count = self.idle_count.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let reuse_rate = self.reuse_rate.load();

        let cache_hit_ratio = ratio(cache_hits, cache_hits + cache_misses);
        let utilization = if max_size == 0 {
            0.0
        } else {
            active_count as f64 / max_size as f64
        };

        PoolStatsSnapshot {
            target: target.to_string(),
            backend,
            total_connections_created: self.total_connections_created.load(Ordering::Relaxed),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_releases: self.total_releases.load(Ordering::Relaxed),
            cache_hits,
            cache_misses,
            failed_connections: self.failed_connections.load(Ordering::Relaxed),
            evicted_connections: self.evicted_connections.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            query_errors: self.query_errors.load(Ordering::Relaxed),
            active_count,
            idle_count,
            peak_active_count: self.peak_active_count.load(Ordering::Relaxed),
            pool_size: active_count + idle_count,
            max_size,
            avg_wait_time_ms: self.avg_wait_time_ms.load(),
            reuse_rate,
            cache_hit_ratio,
            efficiency_score: efficiency_score(reuse_rate, cache_hit_ratio, utilization),
            captured_at: Utc::now(),
        }
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// 计算效率评分，仅用于观测，不参与任何控制决策
pub fn efficiency_score(reuse_rate: f64, cache_hit_ratio: f64, utilization: f64) -> f64 {
    let blended = REUSE_WEIGHT * reuse_rate.clamp(0.0, 1.0)
        + CACHE_WEIGHT * cache_hit_ratio.clamp(0.0, 1.0)
        + UTILIZATION_WEIGHT * utilization.clamp(0.0, 1.0);
    (blended * 100.0).clamp(0.0, 100.0)
}

/// 连接池统计快照
///
/// 对外输出格式只增不减，新字段必须追加
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    pub target: String,
    pub backend: Option<BackendKind>,
    pub total_connections_created: u64,
    pub total_requests: u64,
    pub total_releases: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub failed_connections: u64,
    pub evicted_connections: u64,
    pub timeouts: u64,
    pub query_errors: u64,
    pub active_count: usize,
    pub idle_count: usize,
    pub peak_active_count: usize,
    /// 当前连接总数（空闲 + 借出）
    pub pool_size: usize,
    pub max_size: usize,
    /// 平均等待时间（毫秒，EMA）
    pub avg_wait_time_ms: f64,
    /// 连接复用率（EMA）
    pub reuse_rate: f64,
    pub cache_hit_ratio: f64,
    /// 效率评分 [0, 100]
    pub efficiency_score: f64,
    pub captured_at: DateTime<Utc>,
}
