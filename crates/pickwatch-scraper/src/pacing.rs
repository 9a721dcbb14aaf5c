//! Randomised delays used to pace requests like a person clicking around.

use std::time::Duration;

use pickwatch_core::PacingWindow;
use rand::Rng;

/// Uniform random delay drawn from an inclusive millisecond window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    window: PacingWindow,
}

impl Jitter {
    /// `min_ms > max_ms` is normalised by swapping the bounds.
    #[must_use]
    pub fn new(window: PacingWindow) -> Self {
        let PacingWindow { min_ms, max_ms } = window;
        Self {
            window: PacingWindow::new(min_ms.min(max_ms), min_ms.max(max_ms)),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(PacingWindow::none())
    }

    /// Draw one delay. Kept synchronous so the thread-local RNG never lives
    /// across an `.await`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let PacingWindow { min_ms, max_ms } = self.window;
        if min_ms == max_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Sleep for one sampled delay and return how long that was.
    pub async fn sleep(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
