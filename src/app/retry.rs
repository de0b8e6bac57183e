//! Bounded retry of credential store reads.

/// Number of extra wallet checks allowed after the first `KeysMissing` answer
pub const MAX_KEYCHAIN_READ_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Check the wallet again, `attempt` is the new counter value
    Retry { attempt: u32 },
    /// Give up after `attempts` retries
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeychainRetryPolicy {
    max_retries: u32,
}

impl Default for KeychainRetryPolicy {
    fn default() -> Self {
        Self::new(MAX_KEYCHAIN_READ_RETRIES)
    }
}

impl KeychainRetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decide on a `KeysMissing` outcome, bumping `retries` when another read is allowed.
    ///
    /// `retries` never goes above `max_retries`.
    pub fn decide(&self, retries: &mut u32) -> RetryDecision {
        if *retries < self.max_retries {
            *retries += 1;
            RetryDecision::Retry { attempt: *retries }
        } else {
            RetryDecision::Exhausted { attempts: *retries }
        }
    }
}
