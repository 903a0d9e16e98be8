//! 后端适配器模块
//!
//! 连接池本身与具体数据库无关：打开连接和执行查询都由嵌入方注入。
//! `ConnectionFactory` 负责按目标描述打开/关闭/校验原生连接，
//! `QueryExecutor` 负责在一个独占的连接句柄上执行查询并返回结果行。

use async_trait::async_trait;

use crate::error::PoolResult;
use crate::types::{DataValue, Rows};

mod utils;

pub use utils::{is_write_query, normalize_query};

/// 原生连接工厂
///
/// 线程亲和性等后端特有的限制由工厂实现自行处理，连接池只保证
/// 同一时刻只有一个持有者访问句柄
#[async_trait]
pub trait ConnectionFactory<C>: Send + Sync
where
    C: Send + 'static,
{
    /// 根据目标描述（连接字符串或文件路径）打开一个新连接
    async fn connect(&self, target: &str) -> PoolResult<C>;

    /// 关闭连接，默认直接丢弃句柄
    async fn close(&self, connection: C) -> PoolResult<()> {
        drop(connection);
        Ok(())
    }

    /// 校验连接是否仍然可用
    async fn is_valid(&self, _connection: &mut C) -> bool {
        true
    }
}

/// 原生查询执行器
#[async_trait]
pub trait QueryExecutor<C>: Send + Sync
where
    C: Send + 'static,
{
    /// 在给定连接上执行查询
    async fn execute(&self, connection: &mut C, query: &str, params: &[DataValue])
        -> PoolResult<Rows>;
}
