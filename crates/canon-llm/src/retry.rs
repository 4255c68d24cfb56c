//! Backoff schedule.

use std::time::Duration;

use canon_core::config::RetryConfig;
use rand::Rng;

/// Exponential backoff: `min(base * 2^attempt, max)`, then ±`jitter_fraction`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_fraction: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_fraction: config.jitter_fraction.clamp(0.0, 0.99),
        }
    }

    /// No retries, no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_fraction: 0.0,
        }
    }

    /// Un-jittered delay after failed attempt `attempt` (0-based).
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Jittered delay after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32, rng: &mut impl Rng) -> Duration {
        let base = self.base_delay_for(attempt);
        if self.jitter_fraction <= 0.0 || base.is_zero() {
            return base;
        }
        let factor = rng.gen_range(1.0 - self.jitter_fraction..=1.0 + self.jitter_fraction);
        base.mul_f64(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn delays_double_then_cap() {
        let policy = RetryPolicy::default();
        let secs: Vec<u64> = (0..8).map(|a| policy.base_delay_for(a).as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn huge_attempt_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay_for(400), Duration::from_secs(60));
    }

    #[test]
    fn jitter_stays_within_quarter() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for attempt in 0..6 {
            let base = policy.base_delay_for(attempt).as_secs_f64();
            for _ in 0..50 {
                let d = policy.delay_for(attempt, &mut rng).as_secs_f64();
                assert!(d >= base * 0.75 - 1e-9 && d <= base * 1.25 + 1e-9);
            }
        }
    }

    #[test]
    fn none_policy_never_waits() {
        let policy = RetryPolicy::none();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_for(3, &mut rng), Duration::ZERO);
    }
}
