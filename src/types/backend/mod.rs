use serde::{Deserialize, Serialize};

/// 后端类型
///
/// 连接管理器按后端类型为每类存储维护一个连接池
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 嵌入式、进程内存储（如 SQLite），通常只允许单写者
    Embedded,
    /// 基于服务器的网络存储（如 PostgreSQL、MySQL），支持大量并发连接
    Networked,
}

impl BackendKind {
    /// 获取后端类型的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Embedded => "embedded",
            BackendKind::Networked => "networked",
        }
    }

    /// 从字符串解析后端类型
    pub fn from_str(s: &str) -> Result<Self, crate::error::PoolError> {
        match s.to_lowercase().as_str() {
            "embedded" | "sqlite" => Ok(BackendKind::Embedded),
            "networked" | "postgres" | "postgresql" | "pg" | "mysql" => Ok(BackendKind::Networked),
            _ => Err(crate::quick_error!(backend_not_found, s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!(BackendKind::from_str("SQLite").unwrap(), BackendKind::Embedded);
        assert_eq!(BackendKind::from_str("postgres").unwrap(), BackendKind::Networked);
        assert_eq!(BackendKind::from_str("networked").unwrap(), BackendKind::Networked);
        assert!(BackendKind::from_str("mongodb").is_err());
    }

    #[test]
    fn test_backend_kind_serde() {
        let json = serde_json::to_string(&BackendKind::Embedded).unwrap();
        assert_eq!(json, "\"embedded\"");
        let kind: BackendKind = serde_json::from_str("\"networked\"").unwrap();
        assert_eq!(kind, BackendKind::Networked);
    }
}
