//! 维护操作相关方法

use futures::future::join_all;
use rat_logger::{debug, info, warn};
use std::collections::HashMap;
use std::time::Duration;

use super::{ConnectionManager, ManagerStatistics};
use crate::error::{PoolError, PoolResult};
use crate::pool::SweepReport;
use crate::types::BackendKind;

/// 健康检查借出连接的最长等待时间
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

impl<C: Send + 'static> ConnectionManager<C> {
    /// 检查连接池健康状态
    ///
    /// 对每个连接池做一次借出-归还探测。连接池繁忙导致的等待超时不算不健康。
    /// 探测不计入请求数和复用率统计
    pub async fn health_check(&self) -> HashMap<BackendKind, bool> {
        let mut health_status = HashMap::new();

        for kind in self.backends() {
            let Ok(pool) = self.pool(kind) else {
                continue;
            };

            let timeout = pool.config().acquire_timeout().min(HEALTH_CHECK_TIMEOUT);
            let is_healthy = match pool.probe(timeout).await {
                Ok(()) => true,
                Err(PoolError::PoolExhausted { .. }) => {
                    debug!("{} 连接池繁忙，健康检查跳过探测", kind);
                    true
                }
                Err(e) => {
                    warn!("{} 连接池健康检查失败: {}", kind, e);
                    false
                }
            };

            health_status.insert(kind, is_healthy);
        }

        health_status
    }

    /// 汇总所有连接池的统计信息
    pub fn get_statistics(&self) -> ManagerStatistics {
        let snapshots = self
            .backends()
            .into_iter()
            .filter_map(|kind| self.pool(kind).ok())
            .map(|pool| pool.statistics())
            .collect();
        ManagerStatistics::aggregate(snapshots)
    }

    /// 以 JSON 形式输出统计信息，供运维接口使用
    pub fn get_statistics_json(&self) -> PoolResult<serde_json::Value> {
        serde_json::to_value(self.get_statistics())
            .map_err(|e| crate::quick_error!(serialization, format!("序列化统计信息失败: {}", e)))
    }

    /// 立即对所有连接池执行一次维护扫描
    pub fn sweep_all(&self) -> HashMap<BackendKind, SweepReport> {
        self.pools
            .iter()
            .map(|entry| (*entry.key(), entry.value().sweep()))
            .collect()
    }

    /// 关闭所有连接池并清空管理器
    pub async fn shutdown(&self) {
        let kinds = self.backends();
        let pools: Vec<_> = kinds
            .iter()
            .filter_map(|kind| self.pools.remove(kind).map(|(_, pool)| pool))
            .collect();

        join_all(pools.iter().map(|pool| pool.shutdown())).await;
        info!("连接管理器已关闭: 共关闭 {} 个连接池", pools.len());
    }
}
