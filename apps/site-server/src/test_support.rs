//! In-memory application wiring for handler tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use meridian_core::domain::{LocaleConfig, LocaleDescriptor, LocaleFallback};
use meridian_core::ports::{
    ContentCache, MailError, Mailer, ManualClock, OutboundEmail, RateLimitPolicy,
};
use meridian_infra::{
    CachedContentRepository, FixedWindowRateLimiter, InMemoryContentCache,
    InMemoryContentRepository, IntervalThrottle,
};

use crate::handlers;
use crate::state::{AppState, MailRouting, RevalidateGuard};

pub const TEST_SECRET: &str = "test-secret";

/// A TCP peer address for `ip`, as a test request would arrive from it.
pub fn peer(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), 40_000)
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(MailError::Rejected {
                status: 503,
                message: "provider unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<RecordingMailer>,
    /// The repository behind the content cache.
    pub content: Arc<InMemoryContentRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let mailer = Arc::new(RecordingMailer::default());
        let content = Arc::new(InMemoryContentRepository::default());
        let content_cache: Arc<dyn ContentCache> = Arc::new(InMemoryContentCache::new());

        let locales = LocaleConfig::new(
            vec![
                LocaleDescriptor::new("en-us", "English", "🇺🇸"),
                LocaleDescriptor::new("zh-cn", "中文", "🇨🇳"),
            ],
            "en-us",
        )
        .unwrap();

        let state = AppState {
            clock: clock.clone(),
            rate_limiter: Arc::new(FixedWindowRateLimiter::in_memory(clock.clone())),
            form_policy: RateLimitPolicy::default(),
            locales: Arc::new(locales),
            locale_fallback: LocaleFallback::DefaultLocale,
            content: Arc::new(CachedContentRepository::new(
                content.clone(),
                content_cache.clone(),
                Some(Duration::from_secs(300)),
            )),
            content_cache,
            mailer: mailer.clone(),
            mail: MailRouting {
                from: "Website <website@meridian.test>".to_string(),
                to: vec!["sales@meridian.test".to_string()],
            },
            revalidate: Arc::new(RevalidateGuard {
                secret: Some(TEST_SECRET.to_string()),
                throttle: IntervalThrottle::new(Duration::from_secs(10)),
            }),
            trusted_proxies: 0,
        };

        Self {
            state,
            clock,
            mailer,
            content,
        }
    }

    /// The same app deployed behind `hops` reverse proxies.
    pub fn behind_proxies(mut self, hops: usize) -> Self {
        self.state.trusted_proxies = hops;
        self
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.state.clone()));
        handlers::configure_routes(cfg);
    }
}
