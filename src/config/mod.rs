use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analytics::BreakdownLimits;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON fixture the in-memory source is seeded from.
    /// If None, the source starts empty.
    pub fixture_path: Option<String>,
    /// Domain short codes are displayed under, e.g. `bit.ly`
    pub short_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub top_locations: usize,
    pub top_referrers: usize,
}

impl AnalyticsConfig {
    pub fn limits(&self) -> BreakdownLimits {
        BreakdownLimits {
            top_locations: self.top_locations,
            top_referrers: self.top_referrers,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let limits = BreakdownLimits::default();
        Config {
            api_server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            data: DataConfig {
                fixture_path: None,
                short_domain: "bit.ly".to_string(),
            },
            cache: CacheConfig {
                max_entries: 10_000,
                ttl_secs: 60,
            },
            analytics: AnalyticsConfig {
                top_locations: limits.top_locations,
                top_referrers: limits.top_referrers,
            },
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let api_host =
            std::env::var("API_HOST").unwrap_or_else(|_| defaults.api_server.host.clone());
        let api_port = parse_env("API_PORT", defaults.api_server.port)?;

        let fixture_path = std::env::var("FIXTURE_PATH").ok().filter(|p| !p.is_empty());
        let short_domain =
            std::env::var("SHORT_DOMAIN").unwrap_or_else(|_| defaults.data.short_domain.clone());

        let max_entries = parse_env("CACHE_MAX_ENTRIES", defaults.cache.max_entries)?;
        let ttl_secs = parse_env("CACHE_TTL_SECS", defaults.cache.ttl_secs)?;

        let top_locations = parse_env("TOP_LOCATIONS", defaults.analytics.top_locations)?;
        let top_referrers = parse_env("TOP_REFERRERS", defaults.analytics.top_referrers)?;

        if top_locations == 0 || top_referrers == 0 {
            tracing::warn!(
                "TOP_LOCATIONS/TOP_REFERRERS of 0 folds every category into 'Other'"
            );
        }

        Ok(Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            data: DataConfig {
                fixture_path,
                short_domain,
            },
            cache: CacheConfig {
                max_entries,
                ttl_secs,
            },
            analytics: AnalyticsConfig {
                top_locations,
                top_referrers,
            },
        })
    }
}
