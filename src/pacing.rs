//! Pause policies applied between consecutive page requests.
//!
//! Collectors call [`Pacer::pause`] after a page has been consumed and
//! before the next request is issued; never before the first request.

use crate::config::Config;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits before requesting page `next_page`. Returns once the pause has elapsed.
    async fn pause(&self, next_page: u32);
}

/// No pause at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self, _next_page: u32) {}
}

/// Fixed base delay plus optional random jitter.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    pub base: Duration,
    pub jitter: Duration,
}

impl FixedDelay {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base: Duration::from_millis(base_ms), jitter: Duration::from_millis(jitter_ms) }
    }

    fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 { rand::rng().random_range(0..=jitter_ms) } else { 0 };
        self.base + Duration::from_millis(jitter)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, next_page: u32) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!("Delaying {}ms before page {}", delay.as_millis(), next_page);
        tokio::time::sleep(delay).await;
    }
}

/// Delay that grows geometrically with the page number, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialDelay {
    pub base: Duration,
    pub factor: f64,
    pub max: Duration,
}

impl ExponentialDelay {
    /// Delay before `next_page`; page 2 waits `base`.
    pub fn delay_for(&self, next_page: u32) -> Duration {
        let exponent = next_page.saturating_sub(2) as i32;
        let scaled = self.base.as_millis() as f64 * self.factor.max(1.0).powi(exponent);
        let capped = scaled.min(self.max.as_millis() as f64);
        Duration::from_millis(capped.round() as u64)
    }
}

#[async_trait]
impl Pacer for ExponentialDelay {
    async fn pause(&self, next_page: u32) {
        let delay = self.delay_for(next_page);
        debug!("Delaying {}ms before page {}", delay.as_millis(), next_page);
        tokio::time::sleep(delay).await;
    }
}

/// Pacer selected by the configuration: exponential when a backoff factor
/// is set, fixed otherwise.
pub fn from_config(config: &Config) -> Box<dyn Pacer> {
    match config.backoff_factor {
        Some(factor) if factor > 1.0 => Box::new(ExponentialDelay {
            base: Duration::from_millis(config.delay_ms),
            factor,
            max: Duration::from_millis(config.max_delay_ms.max(config.delay_ms)),
        }),
        _ => Box::new(FixedDelay::new(config.delay_ms, config.delay_jitter_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_without_jitter() {
        let pacer = FixedDelay::new(1000, 0);
        assert_eq!(pacer.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_fixed_delay_jitter_bounds() {
        let pacer = FixedDelay::new(100, 50);
        for _ in 0..50 {
            let d = pacer.next_delay();
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_exponential_delay_growth_and_cap() {
        let pacer = ExponentialDelay {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
        };
        assert_eq!(pacer.delay_for(2), Duration::from_millis(100));
        assert_eq!(pacer.delay_for(3), Duration::from_millis(200));
        assert_eq!(pacer.delay_for(4), Duration::from_millis(400));
        assert_eq!(pacer.delay_for(5), Duration::from_millis(500));
        assert_eq!(pacer.delay_for(40), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_exponential_waits() {
        let config = Config {
            delay_ms: 100,
            backoff_factor: Some(3.0),
            max_delay_ms: 5000,
            ..Config::default()
        };
        let pacer = from_config(&config);
        let start = tokio::time::Instant::now();
        pacer.pause(3).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_waits_full_interval() {
        let pacer = FixedDelay::new(1000, 0);
        let start = tokio::time::Instant::now();
        pacer.pause(2).await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_no_delay_returns_immediately() {
        let start = std::time::Instant::now();
        NoDelay.pause(2).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
