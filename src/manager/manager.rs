//! 连接管理器核心定义

use dashmap::DashMap;
use rat_logger::info;
use std::sync::Arc;

use crate::error::PoolResult;
use crate::pool::ConnectionPool;
use crate::types::BackendKind;

/// 连接管理器 - 按后端类型管理连接池
///
/// 每种后端最多一个连接池。管理器在启动时显式创建，通过 `Arc` 共享给调用方
pub struct ConnectionManager<C: Send + 'static> {
    /// 连接池映射 (后端类型 -> 连接池)
    pub(crate) pools: DashMap<BackendKind, Arc<ConnectionPool<C>>>,
}

impl<C: Send + 'static> ConnectionManager<C> {
    /// 创建新的连接管理器
    pub fn new() -> Self {
        info!("创建连接管理器");

        Self {
            pools: DashMap::new(),
        }
    }

    /// 获取指定后端的连接池
    ///
    /// 返回 `Arc` 副本，调用方持有期间不会占用映射表的锁
    pub fn pool(&self, kind: BackendKind) -> PoolResult<Arc<ConnectionPool<C>>> {
        self.pools
            .get(&kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| crate::quick_error!(backend_not_found, kind))
    }

    /// 已注册的后端类型
    pub fn backends(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<BackendKind> = self.pools.iter().map(|entry| *entry.key()).collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }

    pub fn has_pool(&self, kind: BackendKind) -> bool {
        self.pools.contains_key(&kind)
    }
}

impl<C: Send + 'static> Default for ConnectionManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static> std::fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("backends", &self.backends())
            .finish()
    }
}
