//! 连接管理器模块
//!
//! 对外的统一入口：按后端类型路由到对应的连接池，调用方不需要关心
//! 哪个连接池服务哪个目标。管理器不是全局单例，由应用启动时创建并注入

mod cache_ops;
mod maintenance;
mod manager;
mod pool_ops;
mod statistics;

// 重新导出主要类型
pub use manager::ConnectionManager;
pub use pool_ops::BackendParts;
pub use statistics::ManagerStatistics;
