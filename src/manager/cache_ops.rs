//! 缓存操作相关方法

use rat_logger::info;

use super::ConnectionManager;
use crate::cache::CacheStats;
use crate::error::PoolResult;
use crate::types::BackendKind;

impl<C: Send + 'static> ConnectionManager<C> {
    /// 获取指定后端的缓存统计信息
    pub fn get_cache_stats(&self, kind: BackendKind) -> PoolResult<CacheStats> {
        Ok(self.pool(kind)?.cache_stats())
    }

    /// 清理指定后端的查询缓存，返回清理的条目数
    pub fn clear_cache(&self, kind: BackendKind) -> PoolResult<usize> {
        let cleared = self.pool(kind)?.invalidate_cache();
        info!("已清理 {} 连接池的缓存: {} 条", kind, cleared);
        Ok(cleared)
    }

    /// 清理所有后端的查询缓存，返回清理的条目总数
    pub fn clear_all_caches(&self) -> usize {
        let mut total = 0;
        for entry in self.pools.iter() {
            let cleared = entry.value().invalidate_cache();
            info!("已清理 {} 连接池的缓存: {} 条", entry.key(), cleared);
            total += cleared;
        }
        total
    }
}
