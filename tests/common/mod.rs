//! 集成测试共用的模拟后端

#![allow(dead_code)]

use async_trait::async_trait;
use rat_quickpool::{
    ConnectionFactory, ConnectionPool, DataValue, PoolConfig, PoolResult, QueryExecutor, Row, Rows,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// 模拟连接句柄
#[derive(Debug)]
pub struct MockConnection {
    pub serial: usize,
    pub target: String,
    busy: Arc<AtomicBool>,
}

/// 模拟连接工厂，记录建立/关闭次数，可注入失败和延迟
#[derive(Debug, Default)]
pub struct MockFactory {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub validations: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub invalid: AtomicBool,
    pub connect_delay_ms: AtomicU64,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn set_invalid(&self, invalid: bool) {
        self.invalid.store(invalid, Ordering::SeqCst);
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        self.connect_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionFactory<MockConnection> for MockFactory {
    async fn connect(&self, target: &str) -> PoolResult<MockConnection> {
        let delay = self.connect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(rat_quickpool::quick_error!(connection, "connection refused"));
        }
        let serial = self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            serial,
            target: target.to_string(),
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn close(&self, _connection: MockConnection) -> PoolResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_valid(&self, _connection: &mut MockConnection) -> bool {
        self.validations.fetch_add(1, Ordering::SeqCst);
        !self.invalid.load(Ordering::SeqCst)
    }
}

/// 模拟查询执行器
///
/// 以 `FAIL` 开头的查询返回错误；同一连接被并发使用时记录冲突
#[derive(Debug, Default)]
pub struct MockExecutor {
    pub executions: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub delay_ms: AtomicU64,
}

impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let executor = Self::default();
        executor
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
        Arc::new(executor)
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor<MockConnection> for MockExecutor {
    async fn execute(
        &self,
        connection: &mut MockConnection,
        query: &str,
        params: &[DataValue],
    ) -> PoolResult<Rows> {
        if connection.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.executions.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        connection.busy.store(false, Ordering::SeqCst);

        if query.starts_with("FAIL") {
            return Err(rat_quickpool::quick_error!(query, "mock failure"));
        }

        let mut row = Row::new();
        row.insert("serial".to_string(), DataValue::Int(connection.serial as i64));
        row.insert("target".to_string(), DataValue::String(connection.target.clone()));
        row.insert("query".to_string(), DataValue::String(query.to_string()));
        row.insert("params".to_string(), DataValue::Int(params.len() as i64));
        Ok(vec![row])
    }
}

/// 小容量测试配置
pub fn test_config(min_size: usize, max_size: usize) -> PoolConfig {
    PoolConfig {
        min_size,
        max_size,
        acquire_timeout_ms: 100,
        ..PoolConfig::default()
    }
}

pub fn new_pool(
    config: PoolConfig,
) -> (
    Arc<ConnectionPool<MockConnection>>,
    Arc<MockFactory>,
    Arc<MockExecutor>,
) {
    let factory = MockFactory::new();
    let executor = MockExecutor::new();
    let pool = ConnectionPool::new("mock://test", config, factory.clone(), executor.clone())
        .expect("valid config");
    (pool, factory, executor)
}
