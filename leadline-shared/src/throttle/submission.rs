/// Submission throttle — cooldown gate for public form submissions
///
/// Keyed by a request-origin identifier (typically the client network
/// address). One accepted submission per key per thirty seconds; no burst
/// allowance, single global window. Independent of the login throttle.
///
/// # Example
///
/// ```
/// use leadline_shared::throttle::submission::SubmissionThrottle;
///
/// let throttle = SubmissionThrottle::new();
/// assert!(throttle.can_submit("203.0.113.9"));
/// assert!(!throttle.can_submit("203.0.113.9"));
/// ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Minimum gap between accepted submissions from the same key
pub const SUBMISSION_COOLDOWN: Duration = Duration::from_secs(30);

/// Per-key submission cooldown gate
#[derive(Debug, Default)]
pub struct SubmissionThrottle {
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl SubmissionThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission from the key may be accepted right now
    ///
    /// Returns false inside the cooldown window. Returning true *records*
    /// the acceptance, so a caller that gets true must proceed with the
    /// submission.
    pub fn can_submit(&self, key: &str) -> bool {
        self.can_submit_at(key, Instant::now())
    }

    /// [`Self::can_submit`] with an explicit clock
    pub fn can_submit_at(&self, key: &str, now: Instant) -> bool {
        let mut state = self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = state.get(key) {
            if now.duration_since(*last) < SUBMISSION_COOLDOWN {
                return false;
            }
        }

        state.insert(key.to_string(), now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_submission_accepted() {
        let throttle = SubmissionThrottle::new();
        assert!(throttle.can_submit_at("key", Instant::now()));
    }

    #[test]
    fn test_second_submission_within_window_rejected() {
        let throttle = SubmissionThrottle::new();
        let now = Instant::now();

        assert!(throttle.can_submit_at("key", now));
        assert!(!throttle.can_submit_at("key", now + Duration::from_secs(5)));
        assert!(!throttle.can_submit_at("key", now + Duration::from_secs(29)));
    }

    #[test]
    fn test_accepted_after_cooldown() {
        let throttle = SubmissionThrottle::new();
        let now = Instant::now();

        assert!(throttle.can_submit_at("key", now));
        assert!(!throttle.can_submit_at("key", now + Duration::from_secs(10)));
        assert!(throttle.can_submit_at("key", now + Duration::from_secs(31)));
    }

    #[test]
    fn test_rejected_attempt_does_not_extend_window() {
        let throttle = SubmissionThrottle::new();
        let now = Instant::now();

        assert!(throttle.can_submit_at("key", now));
        // Rejected attempt at t+29 must not push the window out
        assert!(!throttle.can_submit_at("key", now + Duration::from_secs(29)));
        assert!(throttle.can_submit_at("key", now + Duration::from_secs(31)));
    }

    #[test]
    fn test_keys_are_independent() {
        let throttle = SubmissionThrottle::new();
        let now = Instant::now();

        assert!(throttle.can_submit_at("a", now));
        assert!(throttle.can_submit_at("b", now));
        assert!(!throttle.can_submit_at("a", now + Duration::from_secs(1)));
    }
}
