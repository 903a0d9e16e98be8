//! 缓存键生成模块
//!
//! 查询指纹由规范化后的查询文本和带类型标记的参数签名拼接而成，
//! 完整签名直接作为缓存键，不做有损哈希

use rat_logger::debug;
use serde::{Deserialize, Serialize};

use crate::adapter::normalize_query;
use crate::types::DataValue;

/// 缓存键前缀
pub const CACHE_KEY_PREFIX: &str = "rat_quickpool";

/// 查询指纹
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryFingerprint(String);

impl QueryFingerprint {
    /// 根据查询文本和绑定参数生成指纹
    pub fn new(query: &str, params: &[DataValue]) -> Self {
        let normalized = normalize_query(query);
        let params_signature = build_params_signature(params);
        let key = format!(
            "{}:query:{}:{}",
            CACHE_KEY_PREFIX, normalized, params_signature
        );
        debug!("生成查询缓存键: key={}", key);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 构建参数签名
fn build_params_signature(params: &[DataValue]) -> String {
    if params.is_empty() {
        return "no_params".to_string();
    }

    let parts: Vec<String> = params.iter().map(DataValue::signature).collect();
    format!("[{}]", parts.join(","))
}
