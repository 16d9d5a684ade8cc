//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use meridian_core::DomainError;
use meridian_core::domain::{LocaleConfig, LocaleFallback};
use meridian_core::ports::RateLimitPolicy;

use crate::background::SchedulerConfig;

const DEFAULT_LOCALES: &str = "en-us:English:🇺🇸,zh-cn:中文:🇨🇳";
const DEFAULT_MAIL_API_URL: &str = "https://api.resend.com/emails";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Reverse proxies in front of the server whose `X-Forwarded-For`
    /// entries are believed. `0` keys clients on the TCP peer address.
    pub trusted_proxies: usize,
    pub locales: LocaleSettings,
    pub forms: FormSettings,
    pub revalidate: RevalidateSettings,
    pub mail: MailSettings,
    pub content: ContentSettings,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone)]
pub struct LocaleSettings {
    /// `code:Name:flag` entries separated by commas.
    pub list: String,
    pub default_locale: String,
    pub fallback: LocaleFallback,
}

impl LocaleSettings {
    pub fn build(&self) -> Result<LocaleConfig, DomainError> {
        LocaleConfig::parse(&self.list, &self.default_locale)
    }
}

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub policy: RateLimitPolicy,
    /// Snapshot file for the limiter; `None` keeps it memory-only.
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RevalidateSettings {
    pub secret: Option<String>,
    pub min_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_url: String,
    /// Without a key mail is logged, not sent.
    pub api_key: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub snapshot_path: Option<PathBuf>,
    pub cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let persist = parse_bool("RATE_LIMIT_PERSIST", true);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            trusted_proxies: if parse_bool("TRUST_PROXY", false) {
                parse_or("TRUSTED_PROXY_HOPS", 1usize).max(1)
            } else {
                0
            },
            locales: LocaleSettings {
                list: env::var("SITE_LOCALES").unwrap_or_else(|_| DEFAULT_LOCALES.to_string()),
                default_locale: env::var("SITE_DEFAULT_LOCALE")
                    .unwrap_or_else(|_| "en-us".to_string()),
                fallback: match env::var("LOCALE_FALLBACK").as_deref() {
                    Ok("none") => LocaleFallback::None,
                    _ => LocaleFallback::DefaultLocale,
                },
            },
            forms: FormSettings {
                policy: RateLimitPolicy::new(
                    env::var("FORM_RATE_LIMIT_MAX_REQUESTS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .filter(|n: &u32| *n > 0)
                        .unwrap_or(5),
                    Duration::from_secs(parse_or("FORM_RATE_LIMIT_WINDOW_SECS", 3600)),
                ),
                store_path: persist.then(|| {
                    PathBuf::from(
                        env::var("RATE_LIMIT_STORE_PATH")
                            .unwrap_or_else(|_| ".data/rate-limits.json".to_string()),
                    )
                }),
            },
            revalidate: RevalidateSettings {
                secret: env::var("REVALIDATE_SECRET").ok().filter(|s| !s.is_empty()),
                min_interval: Duration::from_secs(parse_or("REVALIDATE_MIN_INTERVAL_SECS", 10)),
            },
            mail: MailSettings {
                api_url: env::var("MAIL_API_URL")
                    .unwrap_or_else(|_| DEFAULT_MAIL_API_URL.to_string()),
                api_key: env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty()),
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "Meridian Website <website@meridian.example>".to_string()),
                to: env::var("MAIL_TO")
                    .unwrap_or_else(|_| "sales@meridian.example".to_string())
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
                timeout: Duration::from_secs(parse_or("MAIL_TIMEOUT_SECS", 10)),
            },
            content: ContentSettings {
                snapshot_path: env::var("CONTENT_SNAPSHOT_PATH").ok().map(PathBuf::from),
                cache_ttl: Duration::from_secs(parse_or("CONTENT_CACHE_TTL_SECS", 300)),
            },
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}
