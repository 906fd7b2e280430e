//! Environment-driven configuration, grounded on the original's scattered
//! `os.getenv` reads (`cache.py`, `ads.py`, `main.py`) collected into one
//! typed struct. `.env` is loaded via `dotenvy`, matching `load_dotenv()`.

use kwmetrics_ads::AdsCredentials;
use std::path::PathBuf;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub struct Config {
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub redis_password: Option<String>,
    pub fifo_cache_path: PathBuf,
    pub trends_snapshot_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub api_host: String,
    pub api_port: u16,
    pub ads_credentials: AdsCredentials,
}

impl Config {
    /// Loads `.env` if present (missing file is not an error, matching
    /// `dotenv.load_dotenv()`) and reads every variable from spec §6's
    /// configuration table.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            cache_ttl_secs: env_parse("CACHE_TTL", 86400),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES", 3000),
            redis_host: env_or("REDIS_HOST", "localhost"),
            redis_port: env_parse("REDIS_PORT", 6379),
            redis_db: env_parse("REDIS_DB", 0),
            redis_password: std::env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            fifo_cache_path: PathBuf::from(env_or("CACHE_FILE", "cache.bin")),
            trends_snapshot_path: PathBuf::from(env_or("TRENDS_SNAPSHOT_FILE", "trends_progress.json")),
            log_dir: PathBuf::from(env_or("LOG_DIR", "./logs")),
            log_level: env_or("LOG_LEVEL", "INFO"),
            api_host: env_or("API_HOST", "127.0.0.1"),
            api_port: env_parse("API_PORT", 8000),
            ads_credentials: AdsCredentials {
                developer_token: std::env::var("GOOGLE_ADS_DEVELOPER_TOKEN").ok(),
                client_id: std::env::var("GOOGLE_ADS_CLIENT_ID").ok(),
                client_secret: std::env::var("GOOGLE_ADS_CLIENT_SECRET").ok(),
                refresh_token: std::env::var("GOOGLE_ADS_REFRESH_TOKEN").ok(),
                customer_id: std::env::var("GOOGLE_ADS_CUSTOMER_ID").ok(),
            },
        }
    }
}
