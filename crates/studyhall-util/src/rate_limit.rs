//! Rate limiting utilities

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Sliding-window rate limiter keyed by operation string
/// (e.g. `signin_<email>`)
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum attempts inside one window
    max_attempts: usize,
    /// Window length
    window: Duration,
    /// Per-key recent attempt timestamps
    attempts: HashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_attempts` - Attempts allowed inside the window
    /// * `window` - Sliding window length
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: HashMap::new(),
        }
    }

    /// Record an attempt for `key` and report whether it is allowed.
    ///
    /// Returns `true` if allowed, `false` if the window is already full.
    /// Denied attempts are not recorded, so a saturated key recovers as
    /// soon as its oldest allowed attempt leaves the window.
    pub fn check(&mut self, key: &str) -> bool {
        let now = Instant::now();
        let recent = self.attempts.entry(key.to_string()).or_default();

        recent.retain(|t| now.duration_since(*t) < self.window);

        if recent.len() >= self.max_attempts {
            return false;
        }

        recent.push(now);
        true
    }

    /// Remove a key's attempt history
    pub fn remove_key(&mut self, key: &str) {
        self.attempts.remove(key);
    }

    /// Clean up keys with no attempts inside the window
    pub fn cleanup(&mut self) {
        let now = Instant::now();
        let window = self.window;
        self.attempts
            .retain(|_, times| times.iter().any(|t| now.duration_since(*t) < window));
    }
}
