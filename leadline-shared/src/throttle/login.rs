/// Login throttle — per-key failed-login counter with a cooldown block
///
/// Keyed by a client or account identifier. Five failures within a ten-minute
/// window block the key for fifteen minutes. Expired blocks are cleared
/// lazily on the next check.
///
/// All time-dependent methods have `*_at` variants taking an explicit
/// `Instant` so the window and block arithmetic is testable without sleeping.
///
/// # Example
///
/// ```
/// use leadline_shared::throttle::login::LoginThrottle;
///
/// let throttle = LoginThrottle::new();
/// assert!(!throttle.is_blocked("10.0.0.1"));
///
/// for _ in 0..5 {
///     throttle.register_failed_login("10.0.0.1");
/// }
/// assert!(throttle.is_blocked("10.0.0.1"));
///
/// throttle.clear_failed_logins("10.0.0.1");
/// assert!(!throttle.is_blocked("10.0.0.1"));
/// ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Failures inside the window before a block is applied
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Window measured from the first failure
pub const FAILURE_WINDOW: Duration = Duration::from_secs(10 * 60);

/// How long a key stays blocked once the threshold is reached
pub const BLOCK_DURATION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct FailureState {
    /// Failures observed within the current window
    count: u32,

    /// When the current window opened
    first_failure_at: Instant,

    /// Set once the threshold is reached
    blocked_until: Option<Instant>,
}

/// Per-key failed-login throttle
#[derive(Debug, Default)]
pub struct LoginThrottle {
    state: Mutex<HashMap<String, FailureState>>,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key is currently blocked
    ///
    /// An expired block clears the key's state entirely.
    pub fn is_blocked(&self, key: &str) -> bool {
        self.is_blocked_at(key, Instant::now())
    }

    /// [`Self::is_blocked`] with an explicit clock
    pub fn is_blocked_at(&self, key: &str, now: Instant) -> bool {
        let mut state = self.lock();

        match state.get(key).and_then(|s| s.blocked_until) {
            Some(until) if until > now => true,
            Some(_) => {
                state.remove(key);
                false
            }
            None => false,
        }
    }

    /// Records a failed login attempt for the key
    ///
    /// Starts a fresh window when the previous one has expired; blocks the
    /// key when the failure threshold is reached within the window.
    pub fn register_failed_login(&self, key: &str) {
        self.register_failed_login_at(key, Instant::now());
    }

    /// [`Self::register_failed_login`] with an explicit clock
    pub fn register_failed_login_at(&self, key: &str, now: Instant) {
        let mut state = self.lock();

        let entry = state
            .entry(key.to_string())
            .and_modify(|s| {
                if now.duration_since(s.first_failure_at) >= FAILURE_WINDOW {
                    // Window expired; start over
                    s.count = 1;
                    s.first_failure_at = now;
                    s.blocked_until = None;
                } else {
                    s.count += 1;
                }
            })
            .or_insert(FailureState {
                count: 1,
                first_failure_at: now,
                blocked_until: None,
            });

        if entry.count >= MAX_FAILED_ATTEMPTS && entry.blocked_until.is_none() {
            tracing::warn!(key = %key, failures = entry.count, "Login throttle engaged");
            entry.blocked_until = Some(now + BLOCK_DURATION);
        }
    }

    /// Clears the key's failure state after a successful authentication
    pub fn clear_failed_logins(&self, key: &str) {
        self.lock().remove(key);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FailureState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_not_blocked() {
        let throttle = LoginThrottle::new();
        assert!(!throttle.is_blocked("nobody"));
    }

    #[test]
    fn test_blocks_after_threshold() {
        let throttle = LoginThrottle::new();
        let now = Instant::now();

        for i in 0..MAX_FAILED_ATTEMPTS {
            assert!(!throttle.is_blocked_at("key", now), "blocked after {} failures", i);
            throttle.register_failed_login_at("key", now);
        }

        assert!(throttle.is_blocked_at("key", now));
    }

    #[test]
    fn test_block_expires_and_state_clears() {
        let throttle = LoginThrottle::new();
        let now = Instant::now();

        for _ in 0..MAX_FAILED_ATTEMPTS {
            throttle.register_failed_login_at("key", now);
        }
        assert!(throttle.is_blocked_at("key", now));
        assert!(throttle.is_blocked_at("key", now + BLOCK_DURATION - Duration::from_secs(1)));

        // Block elapsed: unblocked and state gone
        assert!(!throttle.is_blocked_at("key", now + BLOCK_DURATION + Duration::from_secs(1)));
        assert!(!throttle.is_blocked_at("key", now + BLOCK_DURATION + Duration::from_secs(2)));

        // A single new failure starts a fresh window, not a continuation
        let later = now + BLOCK_DURATION + Duration::from_secs(10);
        throttle.register_failed_login_at("key", later);
        assert!(!throttle.is_blocked_at("key", later));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let throttle = LoginThrottle::new();
        let now = Instant::now();

        for _ in 0..(MAX_FAILED_ATTEMPTS - 1) {
            throttle.register_failed_login_at("key", now);
        }

        // Fifth failure lands after the window; count resets to 1
        let after_window = now + FAILURE_WINDOW + Duration::from_secs(1);
        throttle.register_failed_login_at("key", after_window);
        assert!(!throttle.is_blocked_at("key", after_window));
    }

    #[test]
    fn test_clear_on_success() {
        let throttle = LoginThrottle::new();
        let now = Instant::now();

        for _ in 0..MAX_FAILED_ATTEMPTS {
            throttle.register_failed_login_at("key", now);
        }
        assert!(throttle.is_blocked_at("key", now));

        throttle.clear_failed_logins("key");
        assert!(!throttle.is_blocked_at("key", now));
    }

    #[test]
    fn test_keys_are_independent() {
        let throttle = LoginThrottle::new();
        let now = Instant::now();

        for _ in 0..MAX_FAILED_ATTEMPTS {
            throttle.register_failed_login_at("alice", now);
        }

        assert!(throttle.is_blocked_at("alice", now));
        assert!(!throttle.is_blocked_at("bob", now));
    }
}
