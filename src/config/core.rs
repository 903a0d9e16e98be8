//! # 配置管理模块 - 核心配置类型
//!
//! 管理器配置按后端类型分别给出连接池配置，未出现的后端不会创建连接池

use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PoolError, PoolResult};
use crate::pool::PoolConfig;
use crate::types::BackendKind;

/// 连接管理器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// 嵌入式存储连接池配置
    #[serde(default)]
    pub embedded: Option<PoolConfig>,
    /// 网络存储连接池配置
    #[serde(default)]
    pub networked: Option<PoolConfig>,
}

impl ManagerConfig {
    /// 创建管理器配置构建器
    pub fn builder() -> super::builders::ManagerConfigBuilder {
        super::builders::ManagerConfigBuilder::new()
    }

    /// 从配置文件加载配置，扩展名为 `toml` 时按 TOML 解析，其余按 JSON 解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> PoolResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref()).map_err(PoolError::IoError)?;

        let config = if is_toml(config_path.as_ref()) {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> PoolResult<Self> {
        let config: ManagerConfig = toml::from_str(content)
            .map_err(|e| crate::quick_error!(config, format!("解析TOML配置失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本解析配置
    pub fn from_json_str(content: &str) -> PoolResult<Self> {
        let config: ManagerConfig = serde_json::from_str(content)
            .map_err(|e| crate::quick_error!(config, format!("解析JSON配置失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> PoolResult<()> {
        let content = if is_toml(config_path.as_ref()) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(serialization, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(serialization, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content).map_err(PoolError::IoError)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 获取指定后端的连接池配置
    pub fn pool_config(&self, kind: BackendKind) -> Option<&PoolConfig> {
        match kind {
            BackendKind::Embedded => self.embedded.as_ref(),
            BackendKind::Networked => self.networked.as_ref(),
        }
    }

    /// 已配置的后端
    pub fn backends(&self) -> Vec<BackendKind> {
        [BackendKind::Embedded, BackendKind::Networked]
            .into_iter()
            .filter(|kind| self.pool_config(*kind).is_some())
            .collect()
    }

    /// 校验所有已配置的连接池
    pub fn validate(&self) -> PoolResult<()> {
        for kind in self.backends() {
            if let Some(config) = self.pool_config(kind) {
                config.validate().map_err(|e| {
                    crate::quick_error!(config, format!("{} 连接池配置无效: {}", kind, e))
                })?;
            }
        }
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str_fills_defaults() {
        let config = ManagerConfig::from_toml_str(
            r#"
            [embedded]
            min_size = 1
            max_size = 1

            [networked]
            max_size = 8
            acquire_timeout_ms = 250
            "#,
        )
        .unwrap();

        let networked = config.pool_config(BackendKind::Networked).unwrap();
        assert_eq!(networked.max_size, 8);
        assert_eq!(networked.min_size, 5);
        assert_eq!(networked.acquire_timeout_ms, 250);
        assert_eq!(config.backends(), vec![BackendKind::Embedded, BackendKind::Networked]);
    }

    #[test]
    fn test_invalid_pool_is_rejected() {
        let result = ManagerConfig::from_json_str(r#"{"networked": {"min_size": 9, "max_size": 3}}"#);
        assert!(matches!(result, Err(PoolError::ConfigError { .. })));
    }

    #[test]
    fn test_empty_config() {
        let config = ManagerConfig::from_toml_str("").unwrap();
        assert!(config.backends().is_empty());
    }
}
