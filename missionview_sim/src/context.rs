//! Simulation context implementing MissionContext for deterministic playback.

use async_trait::async_trait;
use missionview_env::MissionContext;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `MissionContext` using:
/// - A virtual clock that only moves when advanced
/// - A seeded ChaCha8 RNG for frame jitter
/// - Simulated sleep that advances virtual time
///
/// Clones share the same clock and RNG.
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic RNG for frame timing
    rng: Arc<Mutex<ChaCha8Rng>>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            epoch: UNIX_EPOCH + Duration::from_secs(1704067200), // 2024-01-01 00:00:00 UTC
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = lock(&self.virtual_time_ns);
        *time = time.saturating_add(duration.as_nanos() as u64);
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        *lock(&self.virtual_time_ns) = time_ns;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *lock(&self.virtual_time_ns)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws a frame interval uniformly from `[min_ms, max_ms]`.
    pub fn jittered_interval(&self, min_ms: u64, max_ms: u64) -> Duration {
        let (lo, hi) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
        let ms = Uniform::new_inclusive(lo, hi).sample(&mut *lock(&self.rng));
        Duration::from_millis(ms)
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            rng: Arc::clone(&self.rng),
            epoch: self.epoch,
        }
    }
}

#[async_trait]
impl MissionContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        // In simulation, sleep advances virtual time
        self.advance_time(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new(42);
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));

        ctx.set_time(250_000_000);
        assert_eq!(ctx.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_clones_share_clock() {
        let ctx = SimContext::new(7);
        let other = ctx.clone();
        other.advance_time(Duration::from_secs(3));
        assert_eq!(ctx.now(), Duration::from_secs(3));
        assert_eq!(ctx.system_time(), UNIX_EPOCH + Duration::from_secs(1704067203));
    }

    #[test]
    fn test_jitter_is_deterministic_and_bounded() {
        let a = SimContext::new(99);
        let b = SimContext::new(99);
        let xs: Vec<Duration> = (0..50).map(|_| a.jittered_interval(5, 100)).collect();
        let ys: Vec<Duration> = (0..50).map(|_| b.jittered_interval(5, 100)).collect();
        assert_eq!(xs, ys);
        assert!(xs
            .iter()
            .all(|d| (Duration::from_millis(5)..=Duration::from_millis(100)).contains(d)));

        let c = SimContext::new(100);
        let zs: Vec<Duration> = (0..50).map(|_| c.jittered_interval(5, 100)).collect();
        assert_ne!(xs, zs);
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let ctx = SimContext::new(1);
        ctx.sleep(Duration::from_millis(16)).await;
        assert_eq!(ctx.now(), Duration::from_millis(16));
    }
}
