//! Wall-clock playback context.
//!
//! Live playback (the terminal dashboard and the `--realtime` CLI mode) reads
//! mission time from here. The clock starts at zero when the context is
//! built, so the first frame of a live run sees `now() == 0` just like a
//! simulated one, and frame pacing is a tokio timer.

use crate::MissionContext;
use async_trait::async_trait;
use std::time::{Duration, Instant, SystemTime};

/// Monotonic playback clock anchored at construction.
///
/// `now()` never goes backwards, which is what keeps elapsed mission time
/// monotonic across pause and resume.
pub struct TokioContext {
    anchor: Instant,
}

impl TokioContext {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MissionContext for TokioContext {
    fn now(&self) -> Duration {
        self.anchor.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    /// Waits out the rest of a frame period on the tokio timer.
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_near_zero() {
        let ctx = TokioContext::new();
        assert!(ctx.now() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_frame_sleep_advances_clock() {
        let ctx = TokioContext::default();
        let before = ctx.now();
        ctx.sleep(Duration::from_millis(10)).await;

        assert!(ctx.now() - before >= Duration::from_millis(10));
    }

    #[test]
    fn test_readings_never_go_backwards() {
        let ctx = TokioContext::new();
        let readings: Vec<Duration> = (0..100).map(|_| ctx.now()).collect();

        assert!(readings.windows(2).all(|w| w[0] <= w[1]));
    }
}
