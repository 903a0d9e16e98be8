//! rat_quickpool - 通用连接池与查询结果缓存引擎
//!
//! 为嵌入式存储和网络存储提供统一的借出/执行接口：
//! 信号量限流的连接池、RAII 连接租约、带 TTL 的只读查询缓存和无锁统计。
//! 打开连接和执行查询由嵌入方注入，引擎本身与具体数据库无关

// 导出所有公共模块
pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod manager;
pub mod pool;
pub mod types;

// 重新导出常用类型和函数
pub use adapter::{ConnectionFactory, QueryExecutor, is_write_query, normalize_query};
pub use cache::{CacheStats, QueryFingerprint, ResultCache};
pub use config::{ManagerConfig, ManagerConfigBuilder, PoolConfigBuilder};
pub use error::{PoolError, PoolResult};
pub use manager::{BackendParts, ConnectionManager, ManagerStatistics};
pub use pool::{
    ConnectionId, ConnectionPool, ConnectionState, LeasedConnection, PoolConfig, PoolStatsSnapshot,
    SweepReport,
};
pub use types::{BackendKind, DataValue, Row, Rows};

// 日志系统导入
use rat_logger::info;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickpool库
///
/// 这个函数会初始化多语言错误消息系统
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
    info!("{} 初始化完成", get_info());
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
