//! 连接池核心模块
//!
//! 并发上限由信号量保证：每个租约持有一个许可，许可总数等于 `max_size`。
//! 空闲列表、连接登记表和关闭标志放在同一把锁里，锁从不跨越 await。
//! 只有持有许可且空闲列表为空时才会新建连接，因此连接总数不会超过 `max_size`。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rat_logger::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::config::PoolConfig;
use super::lease::LeasedConnection;
use super::stats::{PoolStatistics, PoolStatsSnapshot};
use super::types::{ConnectionId, ConnectionState, EvictionReason, PooledConnection};
use crate::adapter::{ConnectionFactory, QueryExecutor, is_write_query};
use crate::cache::{CacheStats, QueryFingerprint, ResultCache};
use crate::error::{PoolError, PoolResult};
use crate::types::{BackendKind, DataValue, Rows};

/// 后台维护任务的最小扫描间隔
pub const MIN_MAINTENANCE_INTERVAL: Duration = Duration::from_millis(100);

/// 持锁访问的连接池状态
struct PoolState<C> {
    /// 空闲连接，栈顶为最近归还的连接
    free_list: Vec<PooledConnection<C>>,
    /// 所有存活连接（空闲 + 借出）
    all_connections: HashSet<ConnectionId>,
    /// 已预留但尚未建立完成的连接数
    pending_creates: usize,
    closed: bool,
}

impl<C> PoolState<C> {
    fn new() -> Self {
        Self {
            free_list: Vec::new(),
            all_connections: HashSet::new(),
            pending_creates: 0,
            closed: false,
        }
    }

    fn active_count(&self) -> usize {
        self.all_connections.len().saturating_sub(self.free_list.len())
    }
}

/// 一次维护扫描的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 被淘汰的空闲连接数
    pub evicted_connections: usize,
    /// 被清理的过期缓存条目数
    pub expired_cache_entries: usize,
}

/// 连接池
///
/// 泛型参数 `C` 为原生连接句柄类型，连接的建立和查询执行由注入的
/// `ConnectionFactory` 与 `QueryExecutor` 完成
pub struct ConnectionPool<C: Send + 'static> {
    target: String,
    backend: Option<BackendKind>,
    config: PoolConfig,
    factory: Arc<dyn ConnectionFactory<C>>,
    executor: Arc<dyn QueryExecutor<C>>,
    state: Mutex<PoolState<C>>,
    semaphore: Arc<Semaphore>,
    cache: ResultCache,
    stats: PoolStatistics,
    maintenance_handle: Mutex<Option<JoinHandle<()>>>,
    created_at: DateTime<Utc>,
}

/// 新建连接时的预留槽位，未完成就被取消时自动归还
struct CreateReservation<'a, C: Send + 'static> {
    pool: &'a ConnectionPool<C>,
    armed: bool,
}

impl<'a, C: Send + 'static> Drop for CreateReservation<'a, C> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.pool.state.lock();
            state.pending_creates = state.pending_creates.saturating_sub(1);
        }
    }
}

/// 正在校验的空闲连接，校验期间被取消时放回空闲列表
struct PendingCheckout<'a, C: Send + 'static> {
    pool: &'a ConnectionPool<C>,
    conn: Option<PooledConnection<C>>,
}

impl<'a, C: Send + 'static> PendingCheckout<'a, C> {
    async fn validate(&mut self) -> bool {
        match self.conn.as_mut() {
            Some(conn) => self.pool.factory.is_valid(&mut conn.handle).await,
            None => false,
        }
    }

    fn take(mut self) -> Option<PooledConnection<C>> {
        self.conn.take()
    }
}

impl<'a, C: Send + 'static> Drop for PendingCheckout<'a, C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.restore_idle(conn);
        }
    }
}

impl<C: Send + 'static> ConnectionPool<C> {
    /// 创建连接池，配置非法时返回 `ConfigError`
    ///
    /// 不会主动建立连接，需要预热时调用 [`warm_up`](Self::warm_up)
    pub fn new(
        target: impl Into<String>,
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory<C>>,
        executor: Arc<dyn QueryExecutor<C>>,
    ) -> PoolResult<Arc<Self>> {
        Self::with_backend(target, None, config, factory, executor)
    }

    /// 创建标记了后端类型的连接池
    pub fn with_backend(
        target: impl Into<String>,
        backend: Option<BackendKind>,
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory<C>>,
        executor: Arc<dyn QueryExecutor<C>>,
    ) -> PoolResult<Arc<Self>> {
        config.validate()?;
        let target = target.into();

        info!(
            "创建连接池: target={}, backend={:?}, min_size={}, max_size={}",
            target, backend, config.min_size, config.max_size
        );

        Ok(Arc::new(Self {
            cache: ResultCache::new(config.cache_max_entries, config.cache_ttl()),
            semaphore: Arc::new(Semaphore::new(config.max_size)),
            state: Mutex::new(PoolState::new()),
            stats: PoolStatistics::new(),
            maintenance_handle: Mutex::new(None),
            created_at: Utc::now(),
            target,
            backend,
            config,
            factory,
            executor,
        }))
    }

    /// 按配置的超时时间借出连接
    pub async fn acquire(self: &Arc<Self>) -> PoolResult<LeasedConnection<C>> {
        self.acquire_timeout(self.config.acquire_timeout()).await
    }

    /// 借出连接
    ///
    /// 优先复用最近归还的空闲连接，没有空闲连接且未达上限时新建。
    /// 达到上限时等待归还，超时返回 `PoolExhausted`，连接池关闭返回 `PoolClosed`。
    /// 调用方在等待中被取消不会占用任何容量
    pub async fn acquire_timeout(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> PoolResult<LeasedConnection<C>> {
        self.checkout(timeout, true).await
    }

    /// 健康探测：借出一个连接后立即归还
    ///
    /// 走完整的借出路径（包括新建和校验），但不计入请求、归还、等待超时和复用率统计
    pub async fn probe(self: &Arc<Self>, timeout: Duration) -> PoolResult<()> {
        let conn = self.checkout(timeout, false).await?;
        conn.release();
        Ok(())
    }

    async fn checkout(
        self: &Arc<Self>,
        timeout: Duration,
        tracked: bool,
    ) -> PoolResult<LeasedConnection<C>> {
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }

        let started = Instant::now();
        let permit = match tokio::time::timeout(timeout, Arc::clone(&self.semaphore).acquire_owned())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(PoolError::PoolClosed),
            Err(_) => {
                if tracked {
                    self.stats.record_timeout();
                }
                warn!(
                    "连接池已耗尽: target={}, max_size={}, 等待 {}ms 超时",
                    self.target,
                    self.config.max_size,
                    timeout.as_millis()
                );
                return Err(PoolError::PoolExhausted {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        };

        loop {
            let candidate = {
                let mut state = self.state.lock();
                if state.closed {
                    return Err(PoolError::PoolClosed);
                }
                match state.free_list.pop() {
                    Some(conn) => {
                        self.refresh_gauges(&state);
                        Some(conn)
                    }
                    None => {
                        if state.all_connections.len() + state.pending_creates
                            >= self.config.max_size
                        {
                            error!(
                                "连接池计数不一致: target={}, connections={}, pending={}",
                                self.target,
                                state.all_connections.len(),
                                state.pending_creates
                            );
                            return Err(PoolError::PoolExhausted {
                                timeout_ms: timeout.as_millis() as u64,
                            });
                        }
                        state.pending_creates += 1;
                        None
                    }
                }
            };

            match candidate {
                Some(mut conn) => {
                    if let Some(reason) = self.stale_reason(&conn) {
                        self.evict(conn, reason);
                        continue;
                    }

                    if conn.suspect || self.config.health_check_on_acquire {
                        let mut pending = PendingCheckout {
                            pool: self,
                            conn: Some(conn),
                        };
                        let healthy = pending.validate().await;
                        let Some(checked) = pending.take() else {
                            continue;
                        };
                        conn = checked;
                        if !healthy {
                            self.evict(conn, EvictionReason::Unhealthy);
                            continue;
                        }
                        conn.suspect = false;
                    }

                    return Ok(self.lease(conn, permit, started, true, tracked));
                }
                None => {
                    let remaining = timeout.saturating_sub(started.elapsed());
                    let conn = self.create_connection(remaining).await?;
                    return Ok(self.lease(conn, permit, started, false, tracked));
                }
            }
        }
    }

    /// 建立新连接，调用前必须已在锁内递增 `pending_creates`
    async fn create_connection(&self, timeout: Duration) -> PoolResult<PooledConnection<C>> {
        let mut reservation = CreateReservation {
            pool: self,
            armed: true,
        };

        let handle = match tokio::time::timeout(timeout, self.factory.connect(&self.target)).await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                self.stats.record_create_failed();
                warn!("创建连接失败: target={}, 错误={}", self.target, e);
                return Err(match e {
                    PoolError::ConnectionCreateFailed { .. } => e,
                    other => PoolError::ConnectionCreateFailed {
                        message: other.to_string(),
                    },
                });
            }
            Err(_) => {
                self.stats.record_create_failed();
                warn!(
                    "创建连接超时: target={}, timeout={}ms",
                    self.target,
                    timeout.as_millis()
                );
                return Err(PoolError::ConnectionCreateFailed {
                    message: format!("connect timed out after {}ms", timeout.as_millis()),
                });
            }
        };

        let conn = PooledConnection::new(handle);
        {
            let mut state = self.state.lock();
            reservation.armed = false;
            state.pending_creates = state.pending_creates.saturating_sub(1);
            if state.closed {
                drop(state);
                self.spawn_close(conn);
                return Err(PoolError::PoolClosed);
            }
            state.all_connections.insert(conn.id);
            self.refresh_gauges(&state);
        }

        self.stats.record_created();
        debug!("创建新连接: target={}, id={}", self.target, conn.id);
        Ok(conn)
    }

    fn lease(
        self: &Arc<Self>,
        mut conn: PooledConnection<C>,
        permit: OwnedSemaphorePermit,
        started: Instant,
        reused: bool,
        tracked: bool,
    ) -> LeasedConnection<C> {
        conn.checkout();
        if tracked {
            self.stats.record_acquire(started.elapsed(), reused);
        }
        debug!(
            "借出连接: target={}, id={}, use_count={}, reused={}",
            self.target, conn.id, conn.use_count, reused
        );
        LeasedConnection::new(conn, Arc::clone(self), permit, tracked)
    }

    /// 归还连接，由租约析构时调用，从不阻塞
    pub(crate) fn return_connection(
        &self,
        mut conn: PooledConnection<C>,
        discard: bool,
        tracked: bool,
    ) {
        if tracked {
            self.stats.record_release();
        }

        let reason = if discard {
            Some(EvictionReason::Discarded)
        } else {
            self.stale_reason(&conn)
        };

        let mut state = self.state.lock();
        let reason = if state.closed {
            Some(EvictionReason::Shutdown)
        } else {
            reason
        };

        match reason {
            Some(reason) => {
                drop(state);
                self.evict(conn, reason);
            }
            None => {
                conn.checkin();
                state.free_list.push(conn);
                self.refresh_gauges(&state);
            }
        }
    }

    /// 把尚未借出的连接放回空闲列表，连接池已关闭时直接淘汰
    fn restore_idle(&self, conn: PooledConnection<C>) {
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            self.evict(conn, EvictionReason::Shutdown);
        } else {
            state.free_list.push(conn);
            self.refresh_gauges(&state);
        }
    }

    /// 判断连接是否应被淘汰
    fn stale_reason(&self, conn: &PooledConnection<C>) -> Option<EvictionReason> {
        if conn.idle_time() > self.config.max_idle() {
            Some(EvictionReason::IdleTimeout)
        } else if conn.use_count >= self.config.max_use_count {
            Some(EvictionReason::UseCountExceeded)
        } else {
            None
        }
    }

    /// 从登记表移除连接并在后台关闭
    fn evict(&self, conn: PooledConnection<C>, reason: EvictionReason) {
        {
            let mut state = self.state.lock();
            state.all_connections.remove(&conn.id);
            self.refresh_gauges(&state);
        }
        self.stats.record_eviction();
        debug!(
            "淘汰连接: target={}, id={}, 原因={}",
            self.target, conn.id, reason
        );
        self.spawn_close(conn);
    }

    /// 在后台任务中关闭连接，没有运行时的情况下直接丢弃句柄
    fn spawn_close(&self, mut conn: PooledConnection<C>) {
        conn.transition(ConnectionState::Closing);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let factory = Arc::clone(&self.factory);
                runtime.spawn(async move {
                    conn.close(factory.as_ref()).await;
                });
            }
            Err(_) => drop(conn),
        }
    }

    fn refresh_gauges(&self, state: &PoolState<C>) {
        self.stats
            .set_gauges(state.active_count(), state.free_list.len());
    }

    /// 借出连接执行一次查询后立即归还
    ///
    /// 写操作成功后清空结果缓存
    pub async fn execute(self: &Arc<Self>, query: &str, params: &[DataValue]) -> PoolResult<Rows> {
        let mut conn = self.acquire().await?;
        conn.execute(query, params).await
    }

    /// 带结果缓存的只读查询
    ///
    /// 写操作不会进入缓存，会记录警告后按 [`execute`](Self::execute) 执行
    pub async fn execute_cached(
        self: &Arc<Self>,
        query: &str,
        params: &[DataValue],
        ttl: Option<Duration>,
    ) -> PoolResult<Rows> {
        if is_write_query(query) {
            warn!("写操作不能使用结果缓存，改为直接执行: target={}", self.target);
            return self.execute(query, params).await;
        }
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }

        let key = QueryFingerprint::new(query, params);
        // 代次在查询前取得，查询期间发生的写操作会使本次结果作废
        let generation = self.cache.generation();
        if let Some(rows) = self.cache.get(&key).await {
            self.stats.record_cache_hit();
            crate::debug_log!("查询缓存命中: target={}", self.target);
            return Ok(rows);
        }
        self.stats.record_cache_miss();

        let rows = self.execute(query, params).await?;
        if !self
            .cache
            .put_if_generation(key, rows.clone(), ttl, generation)
            .await
        {
            debug!("查询结果未写入缓存: target={}", self.target);
        }
        Ok(rows)
    }

    /// 清空结果缓存，返回清理的条目数
    pub fn invalidate_cache(&self) -> usize {
        let cleared = self.cache.clear();
        if cleared > 0 {
            debug!("清空查询缓存: target={}, 条目数={}", self.target, cleared);
        }
        cleared
    }

    /// 预热：建立连接直到总数达到 `min_size`，返回新建数量
    ///
    /// 单个连接建立失败只记录日志，不影响连接池可用性
    pub async fn warm_up(self: &Arc<Self>) -> usize {
        let mut created = 0;
        while self.size() < self.config.min_size {
            let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() else {
                break;
            };

            {
                let mut state = self.state.lock();
                if state.closed
                    || state.all_connections.len() + state.pending_creates >= self.config.max_size
                {
                    break;
                }
                state.pending_creates += 1;
            }

            match self.create_connection(self.config.acquire_timeout()).await {
                Ok(conn) => {
                    let mut state = self.state.lock();
                    if state.closed {
                        drop(state);
                        self.evict(conn, EvictionReason::Shutdown);
                        break;
                    }
                    state.free_list.push(conn);
                    self.refresh_gauges(&state);
                    created += 1;
                }
                Err(e) => {
                    warn!("连接池预热失败: target={}, 错误={}", self.target, e);
                    break;
                }
            }
            drop(permit);
        }

        if created > 0 {
            info!("连接池预热完成: target={}, 新建连接 {} 个", self.target, created);
        }
        created
    }

    /// 维护扫描：淘汰过期空闲连接，清理过期缓存条目
    pub fn sweep(&self) -> SweepReport {
        let stale = {
            let mut state = self.state.lock();
            if state.closed {
                return SweepReport::default();
            }
            let mut kept = Vec::with_capacity(state.free_list.len());
            let mut stale = Vec::new();
            for conn in state.free_list.drain(..) {
                match self.stale_reason(&conn) {
                    Some(reason) => stale.push((conn, reason)),
                    None => kept.push(conn),
                }
            }
            state.free_list = kept;
            stale
        };

        let evicted_connections = stale.len();
        for (conn, reason) in stale {
            self.evict(conn, reason);
        }
        let expired_cache_entries = self.cache.purge_expired();

        if evicted_connections > 0 || expired_cache_entries > 0 {
            debug!(
                "维护扫描完成: target={}, 淘汰连接 {} 个, 清理缓存 {} 条",
                self.target, evicted_connections, expired_cache_entries
            );
        }
        SweepReport {
            evicted_connections,
            expired_cache_entries,
        }
    }

    /// 启动后台维护任务，按给定间隔周期执行扫描，重复调用会替换旧任务
    ///
    /// 间隔不小于 [`MIN_MAINTENANCE_INTERVAL`]。任务只持有弱引用，
    /// 连接池被释放或关闭后自动退出。必须在 tokio 运行时内调用
    pub fn start_maintenance(self: &Arc<Self>, interval: Duration) {
        let interval = if interval < MIN_MAINTENANCE_INTERVAL {
            warn!(
                "维护间隔过短，调整为 {}ms: target={}, interval={:?}",
                MIN_MAINTENANCE_INTERVAL.as_millis(),
                self.target,
                interval
            );
            MIN_MAINTENANCE_INTERVAL
        } else {
            interval
        };
        let weak: Weak<Self> = Arc::downgrade(self);
        let target = self.target.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(pool) = weak.upgrade() else {
                    break;
                };
                if pool.is_closed() {
                    break;
                }
                pool.sweep();
            }
            debug!("连接池维护任务退出: target={}", target);
        });

        if let Some(previous) = self.maintenance_handle.lock().replace(handle) {
            previous.abort();
        }
        debug!(
            "启动连接池维护任务: target={}, interval={}ms",
            self.target,
            interval.as_millis()
        );
    }

    /// 关闭连接池
    ///
    /// 拒绝后续借出并唤醒所有等待者，立即关闭空闲连接；
    /// 仍在借出中的连接在归还时关闭。重复调用无副作用
    pub async fn shutdown(&self) {
        let drained = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let drained: Vec<_> = state.free_list.drain(..).collect();
            for conn in &drained {
                state.all_connections.remove(&conn.id);
            }
            self.refresh_gauges(&state);
            drained
        };

        self.semaphore.close();
        if let Some(handle) = self.maintenance_handle.lock().take() {
            handle.abort();
        }
        self.invalidate_cache();

        let closes = drained.into_iter().map(|mut conn| {
            conn.transition(ConnectionState::Closing);
            self.stats.record_eviction();
            conn.close(self.factory.as_ref())
        });
        futures::future::join_all(closes).await;

        let snapshot = self.statistics();
        info!(
            "连接池已关闭: target={}, 累计创建 {} 个连接, 请求 {} 次, 缓存命中 {} 次",
            self.target,
            snapshot.total_connections_created,
            snapshot.total_requests,
            snapshot.cache_hits
        );
    }

    /// 统计快照，只读取原子计数，不获取连接池锁
    pub fn statistics(&self) -> PoolStatsSnapshot {
        self.stats
            .snapshot(&self.target, self.backend, self.config.max_size)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// 当前连接总数（空闲 + 借出）
    pub fn size(&self) -> usize {
        let state = self.state.lock();
        state.all_connections.len()
    }

    pub fn idle_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().active_count()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn executor(&self) -> &Arc<dyn QueryExecutor<C>> {
        &self.executor
    }

    pub(crate) fn stats(&self) -> &PoolStatistics {
        &self.stats
    }
}

impl<C: Send + 'static> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("target", &self.target)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: Send + 'static> Drop for ConnectionPool<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.maintenance_handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFactory {
        connects: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ConnectionFactory<usize> for CountingFactory {
        async fn connect(&self, _target: &str) -> PoolResult<usize> {
            Ok(self.connects.fetch_add(1, Ordering::SeqCst))
        }

        async fn close(&self, _connection: usize) -> PoolResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct EchoExecutor;

    #[async_trait]
    impl QueryExecutor<usize> for EchoExecutor {
        async fn execute(
            &self,
            connection: &mut usize,
            _query: &str,
            _params: &[DataValue],
        ) -> PoolResult<Rows> {
            let mut row = crate::types::Row::new();
            row.insert("conn".to_string(), DataValue::Int(*connection as i64));
            Ok(vec![row])
        }
    }

    fn pool_with(config: PoolConfig) -> (Arc<ConnectionPool<usize>>, Arc<CountingFactory>) {
        let factory = Arc::new(CountingFactory::default());
        let pool = ConnectionPool::new(
            "memory",
            config,
            factory.clone(),
            Arc::new(EchoExecutor),
        )
        .unwrap();
        (pool, factory)
    }

    fn small_config() -> PoolConfig {
        PoolConfig {
            min_size: 1,
            max_size: 2,
            acquire_timeout_ms: 100,
            ..PoolConfig::default()
        }
    }

    #[tokio::test]
    async fn test_released_connection_is_reused() {
        let (pool, factory) = pool_with(small_config());

        let first = pool.acquire().await.unwrap();
        let id = first.id();
        first.release();

        let second = pool.acquire().await.unwrap();
        assert_eq!(second.id(), id);
        assert_eq!(second.use_count(), 2);
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_most_recently_returned_first() {
        let (pool, _) = pool_with(small_config());

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        let b_id = b.id();
        a.release();
        b.release();

        let next = pool.acquire().await.unwrap();
        assert_eq!(next.id(), b_id);
    }

    #[tokio::test]
    async fn test_discard_closes_connection() {
        let (pool, factory) = pool_with(small_config());

        let conn = pool.acquire().await.unwrap();
        conn.discard();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(pool.size(), 0);
        assert_eq!(factory.closes.load(Ordering::SeqCst), 1);
        assert_eq!(pool.statistics().evicted_connections, 1);
    }

    #[tokio::test]
    async fn test_use_count_ceiling_retires_connection() {
        let config = PoolConfig {
            max_use_count: 2,
            ..small_config()
        };
        let (pool, factory) = pool_with(config);

        pool.acquire().await.unwrap().release();
        pool.acquire().await.unwrap().release();
        assert_eq!(pool.size(), 0);

        pool.acquire().await.unwrap().release();
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_warm_up_reaches_min_size() {
        let config = PoolConfig {
            min_size: 2,
            max_size: 4,
            ..PoolConfig::default()
        };
        let (pool, _) = pool_with(config);

        assert_eq!(pool.warm_up().await, 2);
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.warm_up().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let factory = Arc::new(CountingFactory::default());
        let config = PoolConfig {
            min_size: 5,
            max_size: 2,
            ..PoolConfig::default()
        };
        let result = ConnectionPool::new("memory", config, factory, Arc::new(EchoExecutor));
        assert!(matches!(result, Err(PoolError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (pool, factory) = pool_with(small_config());
        pool.acquire().await.unwrap().release();

        pool.shutdown().await;
        pool.shutdown().await;

        assert!(pool.is_closed());
        assert_eq!(pool.size(), 0);
        assert_eq!(factory.closes.load(Ordering::SeqCst), 1);
        assert!(matches!(pool.acquire().await, Err(PoolError::PoolClosed)));
    }
}
