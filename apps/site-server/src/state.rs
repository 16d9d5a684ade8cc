//! Application state - shared across all handlers.

use std::sync::Arc;

use meridian_core::domain::{LocaleConfig, LocaleFallback};
use meridian_core::ports::{
    Clock, ContentCache, ContentRepository, Mailer, RateLimitPolicy, RateLimiter,
};
use meridian_infra::{
    CachedContentRepository, ConsoleMailer, FixedWindowRateLimiter, InMemoryContentCache,
    InMemoryContentRepository, IntervalThrottle, JsonFileStore, RateLimitConfig,
};

use crate::config::{AppConfig, MailSettings};

/// Where form notifications go.
#[derive(Debug, Clone)]
pub struct MailRouting {
    pub from: String,
    pub to: Vec<String>,
}

/// CMS webhook guard: shared secret plus per-source spacing.
pub struct RevalidateGuard {
    pub secret: Option<String>,
    pub throttle: IntervalThrottle,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub form_policy: RateLimitPolicy,
    pub locales: Arc<LocaleConfig>,
    pub locale_fallback: LocaleFallback,
    pub content: Arc<dyn ContentRepository>,
    pub content_cache: Arc<dyn ContentCache>,
    pub mailer: Arc<dyn Mailer>,
    pub mail: MailRouting,
    pub revalidate: Arc<RevalidateGuard>,
    /// Number of trusted reverse proxies, see `ClientIp`.
    pub trusted_proxies: usize,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let locales = config.locales.build()?;

        let rate_limiter: Arc<dyn RateLimiter> = match &config.forms.store_path {
            Some(path) => {
                let store = Arc::new(JsonFileStore::new(path));
                Arc::new(
                    FixedWindowRateLimiter::with_persistence(
                        clock.clone(),
                        store,
                        RateLimitConfig::default(),
                    )
                    .await,
                )
            }
            None => {
                tracing::info!("Rate limit persistence disabled - using memory only");
                Arc::new(FixedWindowRateLimiter::in_memory(clock.clone()))
            }
        };

        let source: Arc<dyn ContentRepository> = match &config.content.snapshot_path {
            Some(path) => match InMemoryContentRepository::from_snapshot_file(path).await {
                Ok(repo) => Arc::new(repo),
                Err(e) => {
                    tracing::error!("Failed to load content snapshot: {}. Serving no content.", e);
                    Arc::new(InMemoryContentRepository::default())
                }
            },
            None => {
                tracing::warn!("CONTENT_SNAPSHOT_PATH not set. Serving no content.");
                Arc::new(InMemoryContentRepository::default())
            }
        };

        let content_cache: Arc<dyn ContentCache> = Arc::new(InMemoryContentCache::new());
        let content = Arc::new(CachedContentRepository::new(
            source,
            content_cache.clone(),
            Some(config.content.cache_ttl),
        ));

        if config.revalidate.secret.is_none() {
            tracing::warn!("REVALIDATE_SECRET not set. The CMS webhook will reject every call.");
        }

        tracing::info!(
            locales = locales.locales().len(),
            default_locale = %locales.default_locale(),
            "Application state initialized"
        );

        Ok(Self {
            clock,
            rate_limiter,
            form_policy: config.forms.policy,
            locales: Arc::new(locales),
            locale_fallback: config.locales.fallback,
            content,
            content_cache,
            mailer: build_mailer(&config.mail),
            mail: MailRouting {
                from: config.mail.from.clone(),
                to: config.mail.to.clone(),
            },
            revalidate: Arc::new(RevalidateGuard {
                secret: config.revalidate.secret.clone(),
                throttle: IntervalThrottle::new(config.revalidate.min_interval),
            }),
            trusted_proxies: config.trusted_proxies,
        })
    }
}

#[cfg(feature = "http-mail")]
fn build_mailer(settings: &MailSettings) -> Arc<dyn Mailer> {
    use meridian_infra::{HttpMailConfig, HttpMailer};

    match &settings.api_key {
        Some(api_key) => Arc::new(HttpMailer::new(HttpMailConfig {
            api_url: settings.api_url.clone(),
            api_key: api_key.clone(),
            timeout: settings.timeout,
        })),
        None => {
            tracing::warn!("MAIL_API_KEY not set. Form submissions will be logged, not emailed.");
            Arc::new(ConsoleMailer)
        }
    }
}

#[cfg(not(feature = "http-mail"))]
fn build_mailer(_settings: &MailSettings) -> Arc<dyn Mailer> {
    tracing::info!("Running without http-mail feature - form submissions will be logged");
    Arc::new(ConsoleMailer)
}
