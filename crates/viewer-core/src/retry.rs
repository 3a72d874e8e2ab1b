use crate::error::FetchError;

/// Bounded retry of page requests whose signature has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt` is 1-based: the first request for a page is attempt 1.
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        error.is_authorization_expired() && attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_expired_signature_once() {
        let policy = RetryPolicy::default();
        let denied = FetchError::new(401, "expired");

        assert!(policy.should_retry(1, &denied));
        assert!(!policy.should_retry(2, &denied));
    }

    #[test]
    fn other_failures_are_not_retried() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(1, &FetchError::new(404, "missing")));
        assert!(!policy.should_retry(1, &FetchError::new(0, "connection reset")));
    }

    #[test]
    fn at_least_one_attempt_is_made() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }
}
