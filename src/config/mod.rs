//! # 配置管理模块
//!
//! 提供连接池和管理器的配置加载与构建，支持 TOML/JSON 配置文件和链式构建器

pub mod builders;
pub mod core;

pub use crate::pool::PoolConfig;
pub use builders::{ManagerConfigBuilder, PoolConfigBuilder};
pub use core::ManagerConfig;
