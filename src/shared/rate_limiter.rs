use governor::{
    clock::{Clock, DefaultClock},
    state::direct::NotKeyed,
    state::InMemoryState,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::{
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

struct FailureTracker {
    limiter: DirectLimiter,
    locked_until: Option<Instant>,
    last_failure: Instant,
}

/// Rate limiter for login attempts.
///
/// Counts failed logins per email address. Once the quota is exhausted the
/// email is locked out, correct password or not, until the window refills.
/// Default: 5 failures per 15 minutes.
#[derive(Clone)]
pub struct AuthRateLimiter {
    trackers: Arc<RwLock<HashMap<String, FailureTracker>>>,
    quota: Quota,
}

impl AuthRateLimiter {
    pub fn new() -> Self {
        Self::with_config(5, 15)
    }

    /// Zero values are bumped to 1.
    pub fn with_config(max_attempts: u32, window_minutes: u64) -> Self {
        let burst = NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN);
        let window = Duration::from_secs(window_minutes.max(1) * 60);
        let quota = Quota::with_period(window)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            trackers: Arc::new(RwLock::new(HashMap::new())),
            quota,
        }
    }

    /// `Err(wait)` while the email is locked out.
    pub async fn check(&self, email: &str) -> Result<(), Duration> {
        let email = email.to_lowercase();
        let trackers = self.trackers.read().await;

        match trackers.get(&email).and_then(|t| t.locked_until) {
            Some(until) => {
                let now = Instant::now();
                if until > now {
                    Err(until - now)
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }

    /// Records a failed attempt. Returns `Err(wait)` when this failure
    /// exhausted the quota and the email is now locked out.
    pub async fn record_failure(&self, email: &str) -> Result<(), Duration> {
        let email = email.to_lowercase();
        let mut trackers = self.trackers.write().await;

        let tracker = trackers.entry(email).or_insert_with(|| FailureTracker {
            limiter: GovernorRateLimiter::direct(self.quota),
            locked_until: None,
            last_failure: Instant::now(),
        });
        tracker.last_failure = Instant::now();

        match tracker.limiter.check() {
            Ok(_) => Ok(()),
            Err(negative) => {
                let wait = negative.wait_time_from(DefaultClock::default().now());
                tracker.locked_until = Some(Instant::now() + wait);
                Err(wait)
            }
        }
    }

    /// Forget the failures of an email, e.g. after a successful login.
    pub async fn reset(&self, email: &str) {
        let email = email.to_lowercase();
        self.trackers.write().await.remove(&email);
    }

    /// Time for an exhausted quota to refill completely.
    fn full_refill(&self) -> Duration {
        self.quota.replenish_interval() * self.quota.burst_size().get()
    }

    /// Drops trackers that carry no state any more: not locked out, and
    /// with every failure replenished.
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let refill = self.full_refill();
        self.trackers.write().await.retain(|_, tracker| {
            let locked = matches!(tracker.locked_until, Some(until) if until > now);
            locked || tracker.last_failure + refill > now
        });
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
