use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub view_flush: ViewFlushConfig,
    pub locking: LockingConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub article_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewFlushConfig {
    /// 何件の閲覧イベントでフラッシュするか
    pub threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockingConfig {
    /// true なら記事単位のロック、false なら全体で単一ロック
    pub per_article: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub page_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/tsuzuri.db".to_string(),
                max_connections: 5,
            },
            cache: CacheConfig {
                article_ttl_secs: 300, // 5 minutes
            },
            view_flush: ViewFlushConfig { threshold: 10 },
            locking: LockingConfig { per_article: false },
            listing: ListingConfig { page_limit: 10 },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        // データベース設定の環境変数反映
        if let Ok(v) = std::env::var("TSUZURI_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("TSUZURI_DATABASE_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }

        // キャッシュ・フラッシュ設定の環境変数反映
        if let Ok(v) = std::env::var("TSUZURI_CACHE_ARTICLE_TTL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.article_ttl_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("TSUZURI_VIEW_FLUSH_THRESHOLD") {
            if let Some(value) = parse_u64(&v) {
                cfg.view_flush.threshold = value as usize;
            }
        }

        if let Ok(v) = std::env::var("TSUZURI_LOCKING_PER_ARTICLE") {
            cfg.locking.per_article = parse_bool(&v, cfg.locking.per_article);
        }
        if let Ok(v) = std::env::var("TSUZURI_LISTING_PAGE_LIMIT") {
            if let Some(value) = parse_u32(&v) {
                cfg.listing.page_limit = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.cache.article_ttl_secs == 0 {
            return Err("Cache article_ttl_secs must be greater than 0".to_string());
        }
        if self.listing.page_limit == 0 {
            return Err("Listing page_limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    struct EnvGuard {
        key: &'static str,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(self.key);
        }
    }

    fn set_env(key: &'static str, value: &str) -> EnvGuard {
        env::set_var(key, value);
        EnvGuard { key }
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.view_flush.threshold, 10);
        assert!(!cfg.locking.per_article);
    }

    #[test]
    fn from_env_overrides_defaults() {
        let _url = set_env("TSUZURI_DATABASE_URL", "sqlite:data/other.db");
        let _threshold = set_env("TSUZURI_VIEW_FLUSH_THRESHOLD", "3");
        let _locking = set_env("TSUZURI_LOCKING_PER_ARTICLE", "true");

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.database.url, "sqlite:data/other.db");
        assert_eq!(cfg.view_flush.threshold, 3);
        assert!(cfg.locking.per_article);
    }

    #[test]
    fn from_env_keeps_defaults_on_malformed_numbers() {
        let _connections = set_env("TSUZURI_DATABASE_MAX_CONNECTIONS", "abc");

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.database.max_connections, 5);
    }

    #[test]
    fn validate_rejects_zero_max_connections() {
        let mut cfg = AppConfig::default();
        cfg.database.max_connections = 0;

        let message = cfg.validate().unwrap_err();
        assert!(message.contains("max_connections"));
    }

    #[test]
    fn parse_bool_falls_back_to_default() {
        assert!(parse_bool("on", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }
}
