//! Fixed-window rate limiter kept in memory, optionally mirrored to disk.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use meridian_core::ports::{
    Clock, RateLimitDecision, RateLimitEntry, RateLimitPolicy, RateLimitSnapshot, RateLimiter,
    SnapshotStore,
};

use super::persist::DebouncedWriter;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Quiet period before a batch of changes is written.
    pub write_debounce: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            write_debounce: Duration::from_secs(1),
        }
    }
}

/// Per-identifier fixed-window counters.
///
/// A client may send `max_requests` at the end of one window and as many
/// again right after it resets.
///
/// Persistence is decided once, at construction: if the snapshot store cannot
/// be initialised or read, the limiter runs memory-only for its lifetime.
pub struct FixedWindowRateLimiter {
    entries: Arc<Mutex<RateLimitSnapshot>>,
    clock: Arc<dyn Clock>,
    writer: Option<DebouncedWriter>,
}

impl FixedWindowRateLimiter {
    /// A limiter that never touches the filesystem.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(RateLimitSnapshot::new())),
            clock,
            writer: None,
        }
    }

    /// Restore state from `store` and keep it updated in the background.
    ///
    /// Falls back to [`FixedWindowRateLimiter::in_memory`] if the store is
    /// unavailable.
    pub async fn with_persistence(
        clock: Arc<dyn Clock>,
        store: Arc<dyn SnapshotStore>,
        config: RateLimitConfig,
    ) -> Self {
        if let Err(e) = store.init().await {
            tracing::warn!(error = %e, "Rate limit store unavailable, persistence disabled");
            return Self::in_memory(clock);
        }

        let mut entries = match store.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => RateLimitSnapshot::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Rate limit snapshot unreadable, persistence disabled");
                return Self::in_memory(clock);
            }
        };

        let now = clock.now_millis();
        let loaded = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        tracing::info!(
            loaded = loaded,
            live = entries.len(),
            "Rate limit state restored"
        );

        Self {
            entries: Arc::new(Mutex::new(entries)),
            clock,
            writer: Some(DebouncedWriter::new(store, config.write_debounce)),
        }
    }

    pub fn persistence_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the entry for `identifier`, if tracked.
    pub fn entry(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.lock().get(identifier).copied()
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitSnapshot> {
        // Entries are plain data, so a panic elsewhere cannot leave them torn.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_write(&self) {
        if let Some(writer) = &self.writer {
            writer.schedule(&self.entries);
        }
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.now_millis();

        let decision = {
            let mut entries = self.lock();
            match entries.get_mut(identifier) {
                Some(entry) if !entry.is_expired(now) => {
                    if entry.count >= policy.max_requests() {
                        return RateLimitDecision {
                            allowed: false,
                            remaining: 0,
                            reset_time: entry.reset_time,
                        };
                    }
                    entry.count += 1;
                    RateLimitDecision {
                        allowed: true,
                        remaining: policy.max_requests() - entry.count,
                        reset_time: entry.reset_time,
                    }
                }
                _ => {
                    let entry = RateLimitEntry {
                        count: 1,
                        reset_time: now.saturating_add(policy.window_millis()),
                    };
                    entries.insert(identifier.to_string(), entry);
                    RateLimitDecision {
                        allowed: true,
                        remaining: policy.max_requests().saturating_sub(1),
                        reset_time: entry.reset_time,
                    }
                }
            }
        };

        self.schedule_write();
        decision
    }

    fn sweep(&self) -> usize {
        let now = self.clock.now_millis();

        let removed = {
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(now));
            before - entries.len()
        };

        if removed > 0 {
            tracing::debug!(removed = removed, "Swept expired rate limit entries");
            self.schedule_write();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use meridian_core::ports::{ManualClock, PersistenceError};
    use tempfile::TempDir;

    use crate::rate_limit::JsonFileStore;

    const HOUR: Duration = Duration::from_secs(3600);
    const START: i64 = 1_760_000_000_000;

    fn limiter() -> (Arc<ManualClock>, FixedWindowRateLimiter) {
        let clock = Arc::new(ManualClock::new(START));
        let limiter = FixedWindowRateLimiter::in_memory(clock.clone());
        (clock, limiter)
    }

    /// Fails every operation after `init`.
    struct BrokenStore {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotStore for BrokenStore {
        async fn init(&self) -> Result<(), PersistenceError> {
            Ok(())
        }

        async fn load(&self) -> Result<Option<RateLimitSnapshot>, PersistenceError> {
            Ok(None)
        }

        async fn save(&self, _snapshot: &RateLimitSnapshot) -> Result<(), PersistenceError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file system",
            )))
        }
    }

    /// Records what was saved.
    #[derive(Default)]
    struct RecordingStore {
        initial: Option<RateLimitSnapshot>,
        saved: Mutex<Vec<RateLimitSnapshot>>,
    }

    #[async_trait]
    impl SnapshotStore for RecordingStore {
        async fn init(&self) -> Result<(), PersistenceError> {
            Ok(())
        }

        async fn load(&self) -> Result<Option<RateLimitSnapshot>, PersistenceError> {
            Ok(self.initial.clone())
        }

        async fn save(&self, snapshot: &RateLimitSnapshot) -> Result<(), PersistenceError> {
            self.saved.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    struct UnwritableStore;

    #[async_trait]
    impl SnapshotStore for UnwritableStore {
        async fn init(&self) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::ReadOnlyFilesystem,
                "read-only file system",
            )))
        }

        async fn load(&self) -> Result<Option<RateLimitSnapshot>, PersistenceError> {
            unreachable!("load must not be called after a failed init")
        }

        async fn save(&self, _snapshot: &RateLimitSnapshot) -> Result<(), PersistenceError> {
            unreachable!("save must not be called after a failed init")
        }
    }

    #[test]
    fn test_fixed_window_admission() {
        let (_clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(3, HOUR);

        let remaining: Vec<u32> = (0..3)
            .map(|_| {
                let d = limiter.check("k", policy);
                assert!(d.allowed);
                d.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let rejected = limiter.check("k", policy);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_time, START + 3_600_000);
    }

    #[test]
    fn test_rejections_do_not_consume_budget() {
        let (_clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(1, HOUR);

        limiter.check("k", policy);
        for _ in 0..10 {
            assert!(!limiter.check("k", policy).allowed);
        }
        assert_eq!(limiter.entry("k").unwrap().count, 1);
    }

    #[test]
    fn test_window_reset() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(2, Duration::from_secs(60));

        limiter.check("k", policy);
        limiter.check("k", policy);
        assert!(!limiter.check("k", policy).allowed);

        // Still inside the window at exactly reset_time.
        clock.advance(Duration::from_secs(60));
        assert!(!limiter.check("k", policy).allowed);

        clock.advance(Duration::from_millis(1));
        let d = limiter.check("k", policy);
        assert!(d.allowed);
        assert_eq!(d.remaining, 1);
        assert_eq!(d.reset_time, clock.now_millis() + 60_000);
        assert_eq!(limiter.entry("k").unwrap().count, 1);
    }

    #[test]
    fn test_boundary_burst_is_allowed() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(5, HOUR);

        assert!(limiter.check("k", policy).allowed);
        clock.advance(HOUR - Duration::from_millis(1));
        for _ in 0..4 {
            assert!(limiter.check("k", policy).allowed);
        }

        // Two milliseconds later a fresh window admits a full quota again.
        clock.advance(Duration::from_millis(2));
        for _ in 0..5 {
            assert!(limiter.check("k", policy).allowed);
        }
        assert!(!limiter.check("k", policy).allowed);
    }

    #[test]
    fn test_contact_form_scenario() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(5, Duration::from_millis(3_600_000));
        let key = "contact-form:1.2.3.4";

        for _ in 0..5 {
            assert!(limiter.check(key, policy).allowed);
        }
        let sixth = limiter.check(key, policy);
        assert!(!sixth.allowed);
        assert_eq!(sixth.remaining, 0);

        clock.advance(Duration::from_millis(3_600_001));
        let seventh = limiter.check(key, policy);
        assert!(seventh.allowed);
        assert_eq!(seventh.remaining, 4);
    }

    #[test]
    fn test_key_isolation() {
        let (_clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(1, HOUR);

        assert!(limiter.check("contact-form:1.1.1.1", policy).allowed);
        assert!(!limiter.check("contact-form:1.1.1.1", policy).allowed);
        assert!(limiter.check("contact-form:2.2.2.2", policy).allowed);
        assert!(limiter.check("quote-form:1.1.1.1", policy).allowed);
    }

    #[test]
    fn test_concurrent_callers_never_overcount() {
        let (_clock, limiter) = limiter();
        let limiter = Arc::new(limiter);
        let policy = RateLimitPolicy::new(50, HOUR);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    let own = format!("client-{t}");
                    let mut admitted_shared = 0;
                    for _ in 0..20 {
                        assert!(limiter.check(&own, policy).allowed);
                        if limiter.check("shared", policy).allowed {
                            admitted_shared += 1;
                        }
                    }
                    admitted_shared
                })
            })
            .collect();

        let admitted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.entry("shared").unwrap().count, 50);
        for t in 0..8 {
            assert_eq!(limiter.entry(&format!("client-{t}")).unwrap().count, 20);
        }
    }

    #[test]
    fn test_sweep_removes_expired() {
        let (clock, limiter) = limiter();
        limiter.check("short", RateLimitPolicy::new(5, Duration::from_secs(60)));
        limiter.check("long", RateLimitPolicy::new(5, HOUR));

        assert_eq!(limiter.sweep(), 0);
        clock.advance(Duration::from_secs(61));
        assert_eq!(limiter.sweep(), 1);
        assert!(limiter.entry("short").is_none());
        assert!(limiter.entry("long").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_store_matches_memory_only() {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(BrokenStore {
            saves: AtomicUsize::new(0),
        });
        let persisted = FixedWindowRateLimiter::with_persistence(
            clock.clone(),
            store.clone(),
            RateLimitConfig::default(),
        )
        .await;
        let plain = FixedWindowRateLimiter::in_memory(clock.clone());
        assert!(persisted.persistence_enabled());

        let policy = RateLimitPolicy::new(3, Duration::from_secs(10));
        for step in 0..12 {
            if step == 6 {
                clock.advance(Duration::from_secs(11));
            }
            assert_eq!(persisted.check("k", policy), plain.check("k", policy));
            tokio::time::sleep(Duration::from_millis(700)).await;
        }

        assert!(store.saves.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_unwritable_store_disables_persistence() {
        let clock = Arc::new(ManualClock::new(START));
        let limiter = FixedWindowRateLimiter::with_persistence(
            clock,
            Arc::new(UnwritableStore),
            RateLimitConfig::default(),
        )
        .await;

        assert!(!limiter.persistence_enabled());
        assert!(limiter.check("k", RateLimitPolicy::default()).allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_are_debounced() {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(RecordingStore::default());
        let limiter = FixedWindowRateLimiter::with_persistence(
            clock,
            store.clone(),
            RateLimitConfig::default(),
        )
        .await;

        let policy = RateLimitPolicy::new(100, HOUR);
        for i in 0..10 {
            limiter.check(&format!("client-{i}"), policy);
        }
        assert!(store.saved.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        {
            let saved = store.saved.lock().unwrap();
            assert_eq!(saved.len(), 1);
            assert_eq!(saved[0].len(), 10);
        }

        limiter.check("client-0", policy);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1]["client-0"].count, 2);
    }

    #[tokio::test]
    async fn test_bootstrap_drops_expired_entries() {
        let clock = Arc::new(ManualClock::new(START));
        let mut initial = RateLimitSnapshot::new();
        initial.insert(
            "contact-form:9.9.9.9".to_string(),
            RateLimitEntry {
                count: 5,
                reset_time: START + 1000,
            },
        );
        initial.insert(
            "contact-form:8.8.8.8".to_string(),
            RateLimitEntry {
                count: 2,
                reset_time: START - 1,
            },
        );
        let store = Arc::new(RecordingStore {
            initial: Some(initial),
            ..Default::default()
        });

        let limiter =
            FixedWindowRateLimiter::with_persistence(clock, store, RateLimitConfig::default())
                .await;

        assert_eq!(limiter.len(), 1);
        let d = limiter.check("contact-form:9.9.9.9", RateLimitPolicy::default());
        assert!(!d.allowed);
        assert_eq!(d.reset_time, START + 1000);
    }

    #[test]
    fn test_no_runtime_stays_memory_only() {
        // Persistence enabled but called outside a tokio runtime.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(RecordingStore::default());
        let limiter = rt.block_on(FixedWindowRateLimiter::with_persistence(
            clock,
            store.clone(),
            RateLimitConfig::default(),
        ));
        drop(rt);

        assert!(limiter.check("k", RateLimitPolicy::default()).allowed);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_budget_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rate-limits.json");
        let clock = Arc::new(ManualClock::new(START));
        let config = RateLimitConfig {
            write_debounce: Duration::from_millis(20),
        };
        let policy = RateLimitPolicy::default();
        let key = "contact-form:1.2.3.4";

        let before = FixedWindowRateLimiter::with_persistence(
            clock.clone(),
            Arc::new(JsonFileStore::new(&path)),
            config.clone(),
        )
        .await;
        assert!(before.persistence_enabled());
        for _ in 0..5 {
            assert!(before.check(key, policy).allowed);
        }

        // The snapshot is renamed into place, so its presence means it is complete.
        for _ in 0..200 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(path.exists(), "snapshot was never written");
        drop(before);

        let after = FixedWindowRateLimiter::with_persistence(
            clock.clone(),
            Arc::new(JsonFileStore::new(&path)),
            config,
        )
        .await;
        assert!(after.persistence_enabled());
        assert_eq!(after.entry(key).map(|e| e.count), Some(5));
        assert!(!after.check(key, policy).allowed);

        clock.advance(HOUR + Duration::from_millis(1));
        let decision = after.check(key, policy);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }
}
