//! 连接池类型定义模块

use rat_logger::{debug, error, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::adapter::ConnectionFactory;

/// 连接ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 连接生命周期状态
///
/// `Idle -> Active -> Idle` 为正常借还循环，
/// `Idle|Active -> Closing -> Closed` 为淘汰/关闭路径，进入 `Closing` 后不可逆
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// 空闲，位于空闲列表中
    Idle,
    /// 已借出给唯一的调用方
    Active,
    /// 正在关闭
    Closing,
    /// 已关闭（终态）
    Closed,
}

impl ConnectionState {
    /// 状态转换是否合法
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Idle, Active) | (Active, Idle) | (Idle, Closing) | (Active, Closing) | (Closing, Closed)
        )
    }
}

/// 池化连接 - 原生句柄加生命周期元数据
///
/// 句柄在任意时刻只被一个 `PooledConnection` 独占
#[derive(Debug)]
pub struct PooledConnection<C> {
    pub(crate) id: ConnectionId,
    pub(crate) handle: C,
    pub(crate) created_at: Instant,
    pub(crate) last_used_at: Instant,
    pub(crate) use_count: u64,
    pub(crate) state: ConnectionState,
    /// 上一次借出期间查询失败，下次借出前需要重新校验
    pub(crate) suspect: bool,
}

impl<C> PooledConnection<C> {
    pub(crate) fn new(handle: C) -> Self {
        let now = Instant::now();
        Self {
            id: ConnectionId::new(),
            handle,
            created_at: now,
            last_used_at: now,
            use_count: 0,
            state: ConnectionState::Idle,
            suspect: false,
        }
    }

    /// 执行状态转换，非法转换记录错误并保持原状态
    pub(crate) fn transition(&mut self, next: ConnectionState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            error!(
                "连接 {} 非法状态转换: {:?} -> {:?}",
                self.id, self.state, next
            );
            false
        }
    }

    /// 借出：Idle -> Active，递增借出次数
    pub(crate) fn checkout(&mut self) -> bool {
        if !self.transition(ConnectionState::Active) {
            return false;
        }
        self.use_count += 1;
        self.last_used_at = Instant::now();
        true
    }

    /// 归还：Active -> Idle，刷新最后使用时间
    pub(crate) fn checkin(&mut self) -> bool {
        if !self.transition(ConnectionState::Idle) {
            return false;
        }
        self.last_used_at = Instant::now();
        true
    }

    /// 关闭连接：交给工厂关闭原生句柄，完成后进入终态 `Closed`
    ///
    /// 关闭失败只记录日志，返回最终状态
    pub(crate) async fn close(mut self, factory: &dyn ConnectionFactory<C>) -> ConnectionState
    where
        C: Send + 'static,
    {
        if self.state != ConnectionState::Closing {
            self.transition(ConnectionState::Closing);
        }
        let Self {
            id, handle, state, ..
        } = self;

        if let Err(e) = factory.close(handle).await {
            warn!("关闭连接失败: id={}, 错误={}", id, e);
        }
        if !state.can_transition_to(ConnectionState::Closed) {
            error!("连接 {} 非法状态转换: {:?} -> Closed", id, state);
            return state;
        }
        debug!("连接已关闭: id={}", id);
        ConnectionState::Closed
    }

    pub(crate) fn idle_time(&self) -> std::time::Duration {
        self.last_used_at.elapsed()
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn use_count(&self) -> u64 {
        self.use_count
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// 连接被淘汰的原因（仅用于日志，从不返回给调用方）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvictionReason {
    /// 空闲时间超过阈值
    IdleTimeout,
    /// 借出次数超过上限
    UseCountExceeded,
    /// 健康检查失败
    Unhealthy,
    /// 调用方主动丢弃
    Discarded,
    /// 连接池关闭
    Shutdown,
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EvictionReason::IdleTimeout => "空闲超时",
            EvictionReason::UseCountExceeded => "借出次数超限",
            EvictionReason::Unhealthy => "健康检查失败",
            EvictionReason::Discarded => "调用方丢弃",
            EvictionReason::Shutdown => "连接池关闭",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_transitions() {
        use ConnectionState::*;
        assert!(Idle.can_transition_to(Active));
        assert!(Active.can_transition_to(Idle));
        assert!(Idle.can_transition_to(Closing));
        assert!(Active.can_transition_to(Closing));
        assert!(Closing.can_transition_to(Closed));

        assert!(!Closing.can_transition_to(Idle));
        assert!(!Closing.can_transition_to(Active));
        assert!(!Closed.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(Closed));
        assert!(!Active.can_transition_to(Active));
    }

    #[tokio::test]
    async fn test_checkout_and_checkin() {
        let mut conn = PooledConnection::new(42u32);
        assert_eq!(conn.state(), ConnectionState::Idle);

        assert!(conn.checkout());
        assert_eq!(conn.state(), ConnectionState::Active);
        assert_eq!(conn.use_count(), 1);

        // 已借出的连接不能再次借出
        assert!(!conn.checkout());
        assert_eq!(conn.use_count(), 1);

        assert!(conn.checkin());
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_closing_is_irreversible() {
        let mut conn = PooledConnection::new(());
        assert!(conn.transition(ConnectionState::Closing));
        assert!(!conn.checkout());
        assert!(!conn.checkin());
        assert!(conn.transition(ConnectionState::Closed));
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    struct RecordingFactory {
        closed: std::sync::Mutex<Vec<u32>>,
    }

    #[async_trait::async_trait]
    impl ConnectionFactory<u32> for RecordingFactory {
        async fn connect(&self, _target: &str) -> crate::error::PoolResult<u32> {
            Ok(0)
        }

        async fn close(&self, connection: u32) -> crate::error::PoolResult<()> {
            self.closed.lock().unwrap().push(connection);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_close_reaches_terminal_state() {
        let factory = RecordingFactory {
            closed: std::sync::Mutex::new(Vec::new()),
        };

        let mut active = PooledConnection::new(7u32);
        assert!(active.checkout());
        assert_eq!(active.close(&factory).await, ConnectionState::Closed);

        let mut closing = PooledConnection::new(8u32);
        assert!(closing.transition(ConnectionState::Closing));
        assert_eq!(closing.close(&factory).await, ConnectionState::Closed);

        assert_eq!(*factory.closed.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
