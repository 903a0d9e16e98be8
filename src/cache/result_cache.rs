//! 查询结果缓存模块
//!
//! 结果行序列化后存放在 rat_memcache 的 L1 缓存中，容量上限按 FIFO 淘汰，
//! 存储层 TTL 负责回收内存。缓存自身维护一份键索引，记录当前代次内
//! 写入的键和按 tokio 时钟计算的过期时刻，命中判断以索引为准。
//!
//! 清空缓存只递增代次并清空索引：存储键带有代次，旧代次的条目不会再被读到，
//! 之后由存储层的 FIFO/TTL 自然回收。

use bytes::Bytes;
use parking_lot::Mutex;
use rat_logger::{debug, warn};
use rat_memcache::config::{L1Config, L2Config, LoggingConfig, PerformanceConfig, TtlConfig};
use rat_memcache::types::EvictionStrategy;
use rat_memcache::{CacheOptions, RatMemCache, RatMemCacheBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;

use super::key_generator::QueryFingerprint;
use super::stats::{CachePerformanceStats, CacheStats};
use crate::types::Rows;

/// L1 缓存内存上限
const L1_MAX_MEMORY: usize = 64 * 1024 * 1024;

/// 存储层主动过期扫描间隔（秒）
const STORE_CLEANUP_INTERVAL_SECS: u64 = 30;

/// 键索引：当前代次和代次内登记的键
#[derive(Debug, Default)]
struct KeyIndex {
    generation: u64,
    deadlines: HashMap<QueryFingerprint, Instant>,
    stats: CachePerformanceStats,
}

impl KeyIndex {
    /// 存储层已丢失条目时从索引移除，代次已变化则忽略
    fn forget(&mut self, generation: u64, key: &QueryFingerprint) -> bool {
        self.generation == generation && self.deadlines.remove(key).is_some()
    }
}

/// 查询结果缓存
#[derive(Debug)]
pub struct ResultCache {
    /// 首次使用时在运行时内构建，构建失败时缓存退化为全部未命中
    store: OnceCell<Option<Arc<RatMemCache>>>,
    index: Mutex<KeyIndex>,
    max_entries: usize,
    default_ttl: Duration,
}

impl ResultCache {
    /// 创建缓存，`max_entries` 至少为 1
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            store: OnceCell::new(),
            index: Mutex::new(KeyIndex::default()),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    async fn store(&self) -> Option<&RatMemCache> {
        self.store
            .get_or_init(|| build_store(self.max_entries, self.default_ttl))
            .await
            .as_deref()
    }

    /// 当前代次，每次清空缓存递增
    pub fn generation(&self) -> u64 {
        self.index.lock().generation
    }

    /// 查询缓存，条目不存在、已过期或已被存储层淘汰时返回 None
    pub async fn get(&self, key: &QueryFingerprint) -> Option<Rows> {
        let now = Instant::now();
        let generation = {
            let mut index = self.index.lock();
            match index.deadlines.get(key).copied() {
                None => {
                    index.stats.misses += 1;
                    return None;
                }
                Some(deadline) if now > deadline => {
                    index.deadlines.remove(key);
                    index.stats.expirations += 1;
                    index.stats.misses += 1;
                    debug!("缓存条目已过期: key={}", key);
                    return None;
                }
                Some(_) => index.generation,
            }
        };

        let loaded = match self.store().await {
            Some(store) => store.get(&storage_key(generation, key)).await,
            None => Ok(None),
        };

        let mut index = self.index.lock();
        match loaded {
            Ok(Some(data)) => match serde_json::from_slice::<Rows>(&data) {
                Ok(rows) => {
                    index.stats.hits += 1;
                    Some(rows)
                }
                Err(e) => {
                    warn!("缓存结果反序列化失败: key={}, 错误={}", key, e);
                    index.forget(generation, key);
                    index.stats.misses += 1;
                    None
                }
            },
            Ok(None) => {
                if index.forget(generation, key) {
                    index.stats.evictions += 1;
                    debug!("缓存条目已被存储层淘汰: key={}", key);
                }
                index.stats.misses += 1;
                None
            }
            Err(e) => {
                warn!("读取缓存失败: key={}, 错误={}", key, e);
                index.stats.misses += 1;
                None
            }
        }
    }

    /// 写入缓存，覆盖已有条目，`ttl` 为 None 时使用默认 TTL
    pub async fn put(&self, key: QueryFingerprint, rows: Rows, ttl: Option<Duration>) -> bool {
        let generation = self.generation();
        self.put_if_generation(key, rows, ttl, generation).await
    }

    /// 仅当缓存代次仍为 `generation` 时写入
    ///
    /// 查询开始前记下代次，结果返回后用它写入：期间发生过清空时写入被丢弃，
    /// 写操作之前读到的结果不会重新出现在缓存中。返回是否写入
    pub async fn put_if_generation(
        &self,
        key: QueryFingerprint,
        rows: Rows,
        ttl: Option<Duration>,
        generation: u64,
    ) -> bool {
        if self.generation() != generation {
            debug!("缓存代次已变化，跳过写入: key={}", key);
            return false;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let payload = match serde_json::to_vec(&rows) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("缓存结果序列化失败: key={}, 错误={}", key, e);
                return false;
            }
        };
        let Some(store) = self.store().await else {
            return false;
        };

        let options = CacheOptions {
            ttl_seconds: Some(store_ttl_secs(ttl)),
            ..Default::default()
        };
        if let Err(e) = store
            .set_with_options(storage_key(generation, &key), Bytes::from(payload), &options)
            .await
        {
            warn!("写入缓存失败: key={}, 错误={}", key, e);
            return false;
        }

        // 登记与清空在同一把锁内比较代次
        let mut index = self.index.lock();
        if index.generation != generation {
            debug!("写入期间缓存被清空，条目作废: key={}", key);
            return false;
        }
        index.deadlines.insert(key, Instant::now() + ttl);
        index.stats.writes += 1;
        true
    }

    /// 使指定条目失效
    pub fn invalidate(&self, key: &QueryFingerprint) -> bool {
        self.index.lock().deadlines.remove(key).is_some()
    }

    /// 清空缓存，返回清理的条目数
    pub fn clear(&self) -> usize {
        let mut index = self.index.lock();
        index.generation += 1;
        let count = index.deadlines.len();
        index.deadlines.clear();
        count
    }

    /// 清理索引中所有过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut index = self.index.lock();
        let before = index.deadlines.len();
        index.deadlines.retain(|_, deadline| now <= *deadline);
        let removed = before - index.deadlines.len();
        if removed > 0 {
            index.stats.expirations += removed as u64;
            debug!("清理过期缓存条目: {} 个", removed);
        }
        removed
    }

    /// 当前代次内登记的条目数，存储层的淘汰在下一次查询该键时才会反映
    pub fn len(&self) -> usize {
        self.index.lock().deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// 获取缓存统计
    pub fn stats(&self) -> CacheStats {
        let index = self.index.lock();
        CacheStats::from_perf(&index.stats, index.deadlines.len())
    }
}

fn storage_key(generation: u64, key: &QueryFingerprint) -> String {
    format!("{}#{}", key, generation)
}

/// 存储层 TTL 向上取整并多留一秒，保证不早于索引中的过期时刻
fn store_ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0) + 1
}

/// 构建只启用 L1 的 rat_memcache 实例
async fn build_store(max_entries: usize, default_ttl: Duration) -> Option<Arc<RatMemCache>> {
    let result = RatMemCacheBuilder::new()
        .l1_config(L1Config {
            max_memory: L1_MAX_MEMORY,
            max_entries,
            eviction_strategy: EvictionStrategy::Fifo,
        })
        .l2_config(L2Config {
            enable_l2_cache: false,
            data_dir: None,
            max_disk_size: 0,
            write_buffer_size: 0,
            max_write_buffer_number: 0,
            block_cache_size: 0,
            enable_lz4: false,
            compression_threshold: 0,
            compression_max_threshold: 0,
            compression_level: 0,
            background_threads: 0,
            clear_on_startup: false,
            cache_size_mb: 0,
            max_file_size_mb: 0,
            smart_flush_enabled: false,
            smart_flush_base_interval_ms: 100,
            smart_flush_min_interval_ms: 20,
            smart_flush_max_interval_ms: 500,
            smart_flush_write_rate_threshold: 10000,
            smart_flush_accumulated_bytes_threshold: 4 * 1024 * 1024,
            cache_warmup_strategy: rat_memcache::config::CacheWarmupStrategy::Recent,
            zstd_compression_level: None,
            l2_write_strategy: "write_through".to_string(),
            l2_write_threshold: 1024,
            l2_write_ttl_threshold: 3600,
        })
        .ttl_config(TtlConfig {
            expire_seconds: Some(store_ttl_secs(default_ttl)),
            cleanup_interval: STORE_CLEANUP_INTERVAL_SECS,
            max_cleanup_entries: 1000,
            lazy_expiration: true,
            active_expiration: true,
        })
        .performance_config(PerformanceConfig {
            worker_threads: 1,
            enable_concurrency: true,
            read_write_separation: true,
            batch_size: 1000,
            enable_warmup: false,
            large_value_threshold: 10240,
        })
        .logging_config(LoggingConfig {
            level: "WARN".to_string(),
            enable_colors: false,
            show_timestamp: true,
            enable_performance_logs: false,
            enable_audit_logs: false,
            enable_cache_logs: false,
            enable_logging: false,
            enable_async: false,
            batch_size: 2048,
            batch_interval_ms: 25,
            buffer_size: 16384,
        })
        .build()
        .await;

    match result {
        Ok(cache) => {
            debug!("查询结果缓存初始化成功 - L1容量: {}", max_entries);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!("查询结果缓存初始化失败，缓存将被跳过: {}", e);
            None
        }
    }
}
