//! 错误类型模块
//!
//! 连接池引擎对外暴露的统一错误类型，错误消息通过 i18n 模块按当前语言输出

use thiserror::Error;

use crate::i18n::{t, tf};

/// 连接池错误
#[derive(Error, Debug)]
pub enum PoolError {
    /// 连接池已满且在超时时间内没有连接被归还，调用方可以退避后重试
    #[error("{}", tf("error.pool_exhausted", &[("timeout", &.timeout_ms.to_string())]))]
    PoolExhausted { timeout_ms: u64 },

    /// 后端拒绝或无法打开新连接
    #[error("{}", tf("error.connection_create", &[("message", .message.as_str())]))]
    ConnectionCreateFailed { message: String },

    /// 连接池已关闭
    #[error("{}", t("error.pool_closed"))]
    PoolClosed,

    /// 查询执行失败
    #[error("{}", tf("error.query", &[("message", .message.as_str())]))]
    QueryError { message: String },

    /// 配置错误
    #[error("{}", tf("error.config", &[("message", .message.as_str())]))]
    ConfigError { message: String },

    /// 没有为该后端类型注册连接池
    #[error("{}", tf("error.backend_not_found", &[("backend", .backend.as_str())]))]
    BackendNotFound { backend: String },

    /// 序列化错误
    #[error("{}", tf("error.serialization", &[("message", .message.as_str())]))]
    SerializationError { message: String },

    /// IO 错误
    #[error("{}", tf("error.io", &[("message", &.0.to_string())]))]
    IoError(#[from] std::io::Error),
}

impl PoolError {
    /// 是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PoolError::PoolExhausted { .. } | PoolError::ConnectionCreateFailed { .. }
        )
    }
}

/// 连接池结果类型
pub type PoolResult<T> = Result<T, PoolError>;

/// 快速构建常用错误
#[macro_export]
macro_rules! quick_error {
    (config, $msg:expr) => {
        $crate::error::PoolError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::PoolError::QueryError {
            message: $msg.to_string(),
        }
    };
    (connection, $msg:expr) => {
        $crate::error::PoolError::ConnectionCreateFailed {
            message: $msg.to_string(),
        }
    };
    (backend_not_found, $backend:expr) => {
        $crate::error::PoolError::BackendNotFound {
            backend: $backend.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::PoolError::SerializationError {
            message: $msg.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PoolError::PoolExhausted { timeout_ms: 100 }.is_retryable());
        assert!(crate::quick_error!(connection, "refused").is_retryable());
        assert!(!PoolError::PoolClosed.is_retryable());
        assert!(!crate::quick_error!(config, "bad").is_retryable());
    }

    #[test]
    fn test_quick_error_variants() {
        match crate::quick_error!(backend_not_found, "embedded") {
            PoolError::BackendNotFound { backend } => assert_eq!(backend, "embedded"),
            other => panic!("unexpected error: {:?}", other),
        }
        match crate::quick_error!(query, "syntax error") {
            PoolError::QueryError { message } => assert_eq!(message, "syntax error"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
