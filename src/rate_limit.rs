use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email sign-in brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    /// 5 failures per 15 minutes.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// Check if a sign-in attempt is allowed. Returns the seconds until the
    /// window resets when blocked. Does not count the attempt; call
    /// [`Self::record_failure`] on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = *entry.value();

        if now.duration_since(start) > self.window {
            return Ok(());
        }

        if count >= self.max_failures {
            let elapsed = now.duration_since(start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful sign-in.
    pub fn clear(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop entries whose window has passed. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let before = self.entries.len();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < window);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_failures() {
        let limiter = LoginRateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("bob@example.com").is_ok());
            limiter.record_failure("bob@example.com");
        }
        let retry = limiter.check("BOB@example.com").unwrap_err();
        assert!(retry <= 60);

        // other accounts are unaffected
        assert!(limiter.check("alice@example.com").is_ok());
    }

    #[test]
    fn clear_resets() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(60));
        limiter.record_failure("bob@example.com");
        assert!(limiter.check("bob@example.com").is_err());
        limiter.clear("bob@example.com");
        assert!(limiter.check("bob@example.com").is_ok());
    }

    #[test]
    fn window_expiry() {
        let limiter = LoginRateLimiter::new(1, Duration::ZERO);
        limiter.record_failure("bob@example.com");
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.check("bob@example.com").is_ok());
        assert_eq!(limiter.cleanup(), 1);
        assert_eq!(limiter.cleanup(), 0);
    }
}
