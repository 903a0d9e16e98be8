//! 连接池操作相关方法

use rat_logger::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::ConnectionManager;
use crate::adapter::{ConnectionFactory, QueryExecutor};
use crate::config::ManagerConfig;
use crate::error::PoolResult;
use crate::pool::{ConnectionPool, LeasedConnection, PoolConfig};
use crate::types::{BackendKind, DataValue, Rows};

/// 创建连接池所需的后端组件：目标描述、连接工厂、查询执行器
pub type BackendParts<C> = (
    String,
    Arc<dyn ConnectionFactory<C>>,
    Arc<dyn QueryExecutor<C>>,
);

impl<C: Send + 'static> ConnectionManager<C> {
    /// 添加连接池
    ///
    /// `config` 为 None 时使用后端预设：嵌入式存储单连接，网络存储 5/20。
    /// 同类型的旧连接池会被替换并关闭。新连接池创建后立即预热并启动后台维护
    pub async fn add_pool(
        &self,
        kind: BackendKind,
        target: impl Into<String>,
        config: Option<PoolConfig>,
        factory: Arc<dyn ConnectionFactory<C>>,
        executor: Arc<dyn QueryExecutor<C>>,
    ) -> PoolResult<Arc<ConnectionPool<C>>> {
        let config = config.unwrap_or_else(|| PoolConfig::for_backend(kind));
        let pool = ConnectionPool::with_backend(target, Some(kind), config, factory, executor)?;

        pool.warm_up().await;
        pool.start_maintenance(pool.config().maintenance_interval());

        if let Some(previous) = self.pools.insert(kind, Arc::clone(&pool)) {
            warn!("{} 连接池已存在，替换并关闭旧连接池: target={}", kind, previous.target());
            previous.shutdown().await;
        }

        info!("添加连接池: backend={}, target={}", kind, pool.target());
        Ok(pool)
    }

    /// 按管理器配置添加连接池，未在配置中出现的后端跳过
    ///
    /// `backend` 回调按后端类型返回目标描述、连接工厂和查询执行器
    pub async fn add_pools_from_config<F>(
        &self,
        config: &ManagerConfig,
        mut backend: F,
    ) -> PoolResult<Vec<BackendKind>>
    where
        F: FnMut(BackendKind) -> BackendParts<C>,
    {
        let mut added = Vec::new();
        for kind in config.backends() {
            let Some(pool_config) = config.pool_config(kind).cloned() else {
                continue;
            };
            let (target, factory, executor) = backend(kind);
            self.add_pool(kind, target, Some(pool_config), factory, executor)
                .await?;
            added.push(kind);
        }
        Ok(added)
    }

    /// 移除并关闭连接池
    pub async fn remove_pool(&self, kind: BackendKind) -> PoolResult<()> {
        let (_, pool) = self
            .pools
            .remove(&kind)
            .ok_or_else(|| crate::quick_error!(backend_not_found, kind))?;
        pool.shutdown().await;
        info!("移除连接池: backend={}", kind);
        Ok(())
    }

    /// 从指定后端借出连接
    pub async fn get(&self, kind: BackendKind) -> PoolResult<LeasedConnection<C>> {
        self.pool(kind)?.acquire().await
    }

    /// 从指定后端借出连接，使用自定义超时
    pub async fn get_timeout(
        &self,
        kind: BackendKind,
        timeout: Duration,
    ) -> PoolResult<LeasedConnection<C>> {
        self.pool(kind)?.acquire_timeout(timeout).await
    }

    /// 从嵌入式存储连接池借出连接
    pub async fn get_embedded(&self) -> PoolResult<LeasedConnection<C>> {
        self.get(BackendKind::Embedded).await
    }

    /// 从网络存储连接池借出连接
    pub async fn get_networked(&self) -> PoolResult<LeasedConnection<C>> {
        self.get(BackendKind::Networked).await
    }

    /// 在指定后端上执行查询（不使用缓存）
    pub async fn execute(
        &self,
        kind: BackendKind,
        query: &str,
        params: &[DataValue],
    ) -> PoolResult<Rows> {
        self.pool(kind)?.execute(query, params).await
    }

    /// 在指定后端上执行可缓存的只读查询
    pub async fn execute_cached(
        &self,
        kind: BackendKind,
        query: &str,
        params: &[DataValue],
        ttl: Option<Duration>,
    ) -> PoolResult<Rows> {
        self.pool(kind)?.execute_cached(query, params, ttl).await
    }
}
