use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Per-email login brute force limiter: 5 failures per 15 minutes.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Err carries the seconds until the window resets. Does not count the attempt.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = *entry.value();
        let elapsed = start.elapsed();
        if elapsed > WINDOW || count < MAX_FAILURES {
            return Ok(());
        }
        Err(WINDOW.saturating_sub(elapsed).as_secs())
    }

    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();
        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > WINDOW {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn clear(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Remove entries whose window started more than `max_age` ago.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sweep stale login failures every window until the state is dropped.
pub fn spawn_cleanup(state: std::sync::Weak<crate::state::AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(WINDOW);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            state.login_limiter.cleanup(WINDOW);
            tracing::debug!("Login limiter holds {} entries", state.login_limiter.len());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_five_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..4 {
            limiter.record_failure("hr@example.com");
        }
        assert!(limiter.check("hr@example.com").is_ok());

        limiter.record_failure("HR@example.com");
        assert!(limiter.check("hr@example.com").is_err());
        assert!(limiter.check("other@example.com").is_ok());
    }

    #[test]
    fn clear_resets_counter() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("a@b.c");
        }
        limiter.clear("a@b.c");
        assert!(limiter.check("a@b.c").is_ok());
    }

    #[test]
    fn cleanup_drops_only_stale_entries() {
        let limiter = LoginRateLimiter::new();
        limiter.record_failure("old@example.com");
        std::thread::sleep(Duration::from_millis(30));
        limiter.record_failure("new@example.com");

        limiter.cleanup(Duration::from_millis(20));
        assert_eq!(limiter.len(), 1);
        assert!(limiter.entries.contains_key("new@example.com"));

        limiter.cleanup(Duration::ZERO);
        assert!(limiter.is_empty());
    }
}
