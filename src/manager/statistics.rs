//! 管理器统计汇总

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pool::{PoolStatsSnapshot, efficiency_score};

/// 所有连接池的汇总统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStatistics {
    /// 各连接池的统计快照，按后端类型排序
    pub pools: Vec<PoolStatsSnapshot>,
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
    pub pool_size: usize,
    pub max_size: usize,
    pub cache_hit_ratio: f64,
    /// 按请求数加权的复用率
    pub reuse_rate: f64,
    pub efficiency_score: f64,
    pub captured_at: DateTime<Utc>,
}

impl ManagerStatistics {
    /// 从各连接池快照汇总
    pub fn aggregate(pools: Vec<PoolStatsSnapshot>) -> Self {
        let mut stats = Self {
            pools: Vec::new(),
            total_connections_created: 0,
            total_requests: 0,
            total_releases: 0,
            cache_hits: 0,
            cache_misses: 0,
            failed_connections: 0,
            evicted_connections: 0,
            timeouts: 0,
            query_errors: 0,
            active_count: 0,
            idle_count: 0,
            pool_size: 0,
            max_size: 0,
            cache_hit_ratio: 0.0,
            reuse_rate: 0.0,
            efficiency_score: 0.0,
            captured_at: Utc::now(),
        };

        let mut weighted_reuse = 0.0;
        for snapshot in &pools {
            stats.total_connections_created += snapshot.total_connections_created;
            stats.total_requests += snapshot.total_requests;
            stats.total_releases += snapshot.total_releases;
            stats.cache_hits += snapshot.cache_hits;
            stats.cache_misses += snapshot.cache_misses;
            stats.failed_connections += snapshot.failed_connections;
            stats.evicted_connections += snapshot.evicted_connections;
            stats.timeouts += snapshot.timeouts;
            stats.query_errors += snapshot.query_errors;
            stats.active_count += snapshot.active_count;
            stats.idle_count += snapshot.idle_count;
            stats.pool_size += snapshot.pool_size;
            stats.max_size += snapshot.max_size;
            weighted_reuse += snapshot.reuse_rate * snapshot.total_requests as f64;
        }

        let lookups = stats.cache_hits + stats.cache_misses;
        if lookups > 0 {
            stats.cache_hit_ratio = stats.cache_hits as f64 / lookups as f64;
        }
        if stats.total_requests > 0 {
            stats.reuse_rate = weighted_reuse / stats.total_requests as f64;
        }
        let utilization = if stats.max_size == 0 {
            0.0
        } else {
            stats.active_count as f64 / stats.max_size as f64
        };
        stats.efficiency_score =
            efficiency_score(stats.reuse_rate, stats.cache_hit_ratio, utilization);
        stats.pools = pools;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolStatistics;
    use crate::types::BackendKind;

    #[test]
    fn test_aggregate_empty() {
        let stats = ManagerStatistics::aggregate(Vec::new());
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.efficiency_score, 0.0);
        assert!(stats.pools.is_empty());
    }

    #[test]
    fn test_aggregate_sums_pools() {
        let embedded = PoolStatistics::new();
        embedded.set_gauges(1, 0);
        let networked = PoolStatistics::new();
        networked.set_gauges(2, 3);

        let stats = ManagerStatistics::aggregate(vec![
            embedded.snapshot("db.sqlite", Some(BackendKind::Embedded), 1),
            networked.snapshot("postgres://", Some(BackendKind::Networked), 20),
        ]);

        assert_eq!(stats.pools.len(), 2);
        assert_eq!(stats.active_count, 3);
        assert_eq!(stats.idle_count, 3);
        assert_eq!(stats.pool_size, 6);
        assert_eq!(stats.max_size, 21);
        assert!(stats.efficiency_score > 0.0 && stats.efficiency_score <= 100.0);
    }
}
