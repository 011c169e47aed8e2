//! 页面内容缓存 - 基础设施层
//!
//! 按 URL 缓存抓取并清洗后的事实列表。条目超过 TTL 后视为过期，
//! 读取时直接视为未命中；不会主动清理。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// 默认有效期：6 小时
pub const DEFAULT_TTL_SECS: i64 = 6 * 60 * 60;

/// 带时间戳的缓存条目
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }
}

/// 页面内容缓存
///
/// 读多写少，使用读写锁；返回值都是独立的副本
pub struct ContentCache {
    entries: RwLock<HashMap<String, CachedData<Vec<String>>>>,
    ttl: Duration,
}

impl ContentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// 超出 chrono 可表示范围的有效期退回默认值
    pub fn with_ttl_secs(ttl_secs: i64) -> Self {
        let ttl = Duration::try_seconds(ttl_secs).unwrap_or_else(|| {
            warn!(
                "⚠️ 缓存有效期 {}s 超出范围，使用默认值 {}s",
                ttl_secs, DEFAULT_TTL_SECS
            );
            Duration::seconds(DEFAULT_TTL_SECS)
        });
        Self::new(ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 读取未过期的内容
    pub fn get(&self, url: &str) -> Option<Vec<String>> {
        self.get_at(url, Utc::now())
    }

    /// 以指定时间读取，过期条目按未命中处理
    pub fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<Vec<String>> {
        let entries = self.entries.read().expect("content cache poisoned");
        let cached = entries.get(url)?;
        if cached.is_stale(now, self.ttl) {
            debug!("缓存已过期: {} (age {}s)", url, cached.age(now).num_seconds());
            return None;
        }
        Some(cached.data.clone())
    }

    /// 写入内容；空内容不写入
    pub fn put(&self, url: &str, value: Vec<String>) {
        self.put_at(url, value, Utc::now());
    }

    /// 以指定时间写入，覆盖旧条目
    pub fn put_at(&self, url: &str, value: Vec<String>, now: DateTime<Utc>) {
        if value.is_empty() {
            return;
        }
        let mut entries = self.entries.write().expect("content cache poisoned");
        entries.insert(url.to_string(), CachedData::new(value, now));
    }

    /// 已存储的条目数（包括过期条目）
    pub fn len(&self) -> usize {
        self.entries.read().expect("content cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::with_ttl_secs(DEFAULT_TTL_SECS)
    }
}
