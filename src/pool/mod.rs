//! 连接池模块
//!
//! 信号量限流的通用连接池：空闲连接按最近归还优先复用，
//! 借出的连接由 `LeasedConnection` 独占并在析构时自动归还。
//! 空闲超时和借出次数超限的连接会被淘汰，后台维护任务周期性清理。

// 导入所有子模块
pub mod config;
pub mod lease;
pub mod pool;
pub mod stats;
pub mod types;

// 重新导出主要的公共类型和结构体
pub use config::PoolConfig;
pub use lease::LeasedConnection;
pub use pool::{ConnectionPool, MIN_MAINTENANCE_INTERVAL, SweepReport};
pub use stats::{EMA_ALPHA, PoolStatistics, PoolStatsSnapshot, efficiency_score};
pub use types::{ConnectionId, ConnectionState, PooledConnection};
