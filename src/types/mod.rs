//! 通用类型定义
//!
//! 定义后端类型、查询参数与结果行等跨模块共享的数据类型

pub mod backend;
pub mod data_value;

// 重新导出所有公共类型
pub use backend::BackendKind;
pub use data_value::{DataValue, Row, Rows};
