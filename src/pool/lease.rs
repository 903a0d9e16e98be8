//! 连接租约模块
//!
//! `LeasedConnection` 是借出连接的唯一持有者，离开作用域时自动归还。
//! 归还顺序固定：先把连接放回空闲列表，再释放信号量许可，
//! 等待者被唤醒时一定能看到刚归还的连接。

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::Instant;

use super::pool::ConnectionPool;
use super::types::{ConnectionId, PooledConnection};
use crate::adapter::is_write_query;
use crate::error::PoolResult;
use crate::types::{DataValue, Rows};

/// 借出的连接
///
/// 可以通过 `Deref`/`DerefMut` 直接访问原生句柄
pub struct LeasedConnection<C: Send + 'static> {
    conn: Option<PooledConnection<C>>,
    pool: Arc<ConnectionPool<C>>,
    discard: bool,
    /// 健康探测借出的连接不计入统计
    tracked: bool,
    // 字段按声明顺序析构，许可必须在 Drop::drop 归还连接之后释放
    _permit: OwnedSemaphorePermit,
}

impl<C: Send + 'static> LeasedConnection<C> {
    pub(crate) fn new(
        conn: PooledConnection<C>,
        pool: Arc<ConnectionPool<C>>,
        permit: OwnedSemaphorePermit,
        tracked: bool,
    ) -> Self {
        Self {
            conn: Some(conn),
            pool,
            discard: false,
            tracked,
            _permit: permit,
        }
    }

    fn inner(&self) -> &PooledConnection<C> {
        self.conn
            .as_ref()
            .expect("leased connection is present until dropped")
    }

    fn inner_mut(&mut self) -> &mut PooledConnection<C> {
        self.conn
            .as_mut()
            .expect("leased connection is present until dropped")
    }

    /// 在借出的连接上执行查询
    ///
    /// 查询失败时连接被标记为可疑，下次借出前会重新校验；
    /// 写操作成功后清空所属连接池的结果缓存
    pub async fn execute(&mut self, query: &str, params: &[DataValue]) -> PoolResult<Rows> {
        let pool = Arc::clone(&self.pool);
        let conn = self.inner_mut();

        match pool.executor().execute(&mut conn.handle, query, params).await {
            Ok(rows) => {
                if is_write_query(query) {
                    pool.invalidate_cache();
                }
                Ok(rows)
            }
            Err(e) => {
                conn.suspect = true;
                pool.stats().record_query_error();
                Err(e)
            }
        }
    }

    /// 显式归还连接，等价于直接丢弃租约
    pub fn release(self) {
        drop(self);
    }

    /// 丢弃连接：归还时直接关闭而不是放回空闲列表
    pub fn discard(mut self) {
        self.discard = true;
    }

    pub fn id(&self) -> ConnectionId {
        self.inner().id
    }

    pub fn use_count(&self) -> u64 {
        self.inner().use_count
    }

    pub fn created_at(&self) -> Instant {
        self.inner().created_at
    }

    /// 所属连接池的目标描述
    pub fn target(&self) -> &str {
        self.pool.target()
    }
}

impl<C: Send + 'static> Deref for LeasedConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner().handle
    }
}

impl<C: Send + 'static> DerefMut for LeasedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner_mut().handle
    }
}

impl<C: Send + 'static> std::fmt::Debug for LeasedConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("LeasedConnection");
        if let Some(conn) = &self.conn {
            s.field("id", &conn.id).field("use_count", &conn.use_count);
        }
        s.field("target", &self.pool.target())
            .field("discard", &self.discard)
            .finish()
    }
}

impl<C: Send + 'static> Drop for LeasedConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool
                .return_connection(conn, self.discard, self.tracked);
        }
    }
}
