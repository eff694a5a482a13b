use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::cache::CacheConfig;
use crate::model::payroll::PayrollPolicy;
use crate::resource::Buckets;

/// Selects the in-process store instead of a remote one.
pub const MEMORY_GATEWAY: &str = "memory://";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub gateway_url: String,
    /// Empty for the in-memory gateway.
    pub gateway_api_key: String,
    pub gateway_timeout: Duration,
    pub buckets: Buckets,
    pub cache: CacheConfig,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub preferences_path: String,
    pub payroll_policy: PayrollPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let gateway_url = lookup("GATEWAY_URL").context("GATEWAY_URL must be set")?;
        let gateway_api_key = lookup("GATEWAY_API_KEY").unwrap_or_default();
        if gateway_url != MEMORY_GATEWAY && gateway_api_key.is_empty() {
            bail!("GATEWAY_API_KEY must be set for {gateway_url}");
        }

        let ttl_secs: u64 = parse(&lookup, "CACHE_TTL_SECS", 300)?;
        let allowance_rate: f64 = parse(&lookup, "PAYROLL_ALLOWANCE_RATE", 0.10)?;
        let deduction_rate: f64 = parse(&lookup, "PAYROLL_DEDUCTION_RATE", 0.08)?;
        for (key, rate) in [
            ("PAYROLL_ALLOWANCE_RATE", allowance_rate),
            ("PAYROLL_DEDUCTION_RATE", deduction_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                bail!("{key} must be between 0 and 1, got {rate}");
            }
        }

        Ok(Self {
            server_addr: text("SERVER_ADDR", "127.0.0.1:8080"),
            gateway_url,
            gateway_api_key,
            gateway_timeout: Duration::from_secs(parse(&lookup, "GATEWAY_TIMEOUT_SECS", 10)?),
            buckets: Buckets {
                avatars: text("AVATAR_BUCKET", "employee-avatars"),
                documents: text("DOCUMENT_BUCKET", "employee-documents"),
            },
            cache: CacheConfig {
                max_keys: parse(&lookup, "CACHE_MAX_KEYS", 1024)?,
                // 0 keeps entries until they are invalidated or evicted
                ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
                event_buffer: parse(&lookup, "CACHE_EVENT_BUFFER", 256)?,
            },
            rate_api_per_min: parse(&lookup, "RATE_API_PER_MIN", 1000)?,
            api_prefix: text("API_PREFIX", "/api"),
            log_dir: text("LOG_DIR", "logs"),
            preferences_path: text("PREFERENCES_PATH", "preferences.json"),
            payroll_policy: PayrollPolicy {
                allowance_rate,
                deduction_rate,
            },
        })
    }

    pub fn uses_memory_gateway(&self) -> bool {
        self.gateway_url == MEMORY_GATEWAY
    }
}

fn parse<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_gateway_needs_no_key() {
        let config = Config::from_lookup(lookup(&[("GATEWAY_URL", "memory://")])).unwrap();

        assert!(config.uses_memory_gateway());
        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.cache.max_keys, 1024);
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(300)));
        assert_eq!(config.rate_api_per_min, 1000);
        assert_eq!(config.buckets.avatars, "employee-avatars");
        assert_eq!(config.payroll_policy.allowance_rate, 0.10);
    }

    #[test]
    fn remote_gateway_requires_key() {
        let err = Config::from_lookup(lookup(&[("GATEWAY_URL", "https://hr.example.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("GATEWAY_API_KEY"));
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let config = Config::from_lookup(lookup(&[
            ("GATEWAY_URL", "memory://"),
            ("CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.cache.ttl, None);
    }

    #[test]
    fn bad_numbers_name_their_key() {
        let err = Config::from_lookup(lookup(&[
            ("GATEWAY_URL", "memory://"),
            ("CACHE_MAX_KEYS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CACHE_MAX_KEYS"));

        let err = Config::from_lookup(lookup(&[
            ("GATEWAY_URL", "memory://"),
            ("PAYROLL_DEDUCTION_RATE", "1.5"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PAYROLL_DEDUCTION_RATE"));
    }
}
