//! Redis-backed cache, grounded on the original `RedisCache`: JSON values,
//! `SETEX` for absolute TTL, every backend error swallowed to a miss/fail.

use crate::backend::CacheBackend;
use kwmetrics_core::MetricRecord;
use redis::Commands;
use std::sync::Mutex;

pub struct RedisBackend {
    conn: Mutex<redis::Connection>,
}

impl RedisBackend {
    /// Opens a connection and issues a liveness probe (`PING`). Returns an
    /// error if Redis is unreachable, so callers can fall back to the
    /// on-disk backend — selection is final for the process lifetime.
    pub fn connect(host: &str, port: u16, db: i64, password: Option<&str>) -> redis::RedisResult<Self> {
        let mut url = format!("redis://{host}:{port}/{db}");
        if let Some(password) = password {
            url = format!("redis://:{password}@{host}:{port}/{db}");
        }
        let client = redis::Client::open(url)?;
        let mut conn = client.get_connection()?;
        redis::cmd("PING").query::<String>(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CacheBackend for RedisBackend {
    fn get(&self, key: &str) -> Option<MetricRecord> {
        let mut conn = self.conn.lock().unwrap();
        let raw: Option<String> = match conn.get(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "redis get error");
                return None;
            }
        };
        raw.and_then(|s| match serde_json::from_str(&s) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(error = %e, "redis value deserialization error");
                None
            }
        })
    }

    fn set(&self, key: &str, value: MetricRecord, ttl_secs: u64) -> bool {
        let json = match serde_json::to_string(&value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "redis value serialization error");
                return false;
            }
        };
        let mut conn = self.conn.lock().unwrap();
        let result: redis::RedisResult<()> = conn.set_ex(key, json, ttl_secs);
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "redis set error");
                false
            }
        }
    }

    fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.lock().unwrap();
        match conn.exists(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "redis exists error");
                false
            }
        }
    }

    fn delete(&self, key: &str) -> bool {
        let mut conn = self.conn.lock().unwrap();
        let deleted: redis::RedisResult<u64> = conn.del(key);
        match deleted {
            Ok(n) => n > 0,
            Err(e) => {
                tracing::error!(error = %e, "redis delete error");
                false
            }
        }
    }
}
