use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Time source used for pacing, injectable so waits can be observed in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that never blocks: `sleep` advances virtual time and records the request.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: StdMutex<Duration>,
    sleeps: StdMutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: StdMutex::new(Duration::ZERO),
            sleeps: StdMutex::new(Vec::new()),
        }
    }

    /// Move virtual time forward without recording a sleep
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
pub struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
            clock,
        }
    }

    pub fn per_minute(max_requests: usize, clock: Arc<dyn Clock>) -> Self {
        Self::new(max_requests, Duration::from_secs(60), clock)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Wait for a free slot and claim it. Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = self.clock.now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return waited;
            }

            // Need to wait until the oldest request falls out of the window
            let oldest = match ts.front() {
                Some(&front) => front,
                None => continue,
            };
            let sleep_dur = (oldest + self.window).saturating_duration_since(now);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for a request slot", sleep_dur.as_secs_f64());
            self.clock.sleep(sleep_dur).await;
            waited += sleep_dur;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_call_per_interval_spaces_calls() {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::new(1, Duration::from_secs(12), clock.clone());

        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.acquire().await, Duration::from_secs(12));
        assert_eq!(limiter.acquire().await, Duration::from_secs(12));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(12); 2]);
    }

    #[tokio::test]
    async fn test_burst_up_to_quota_then_wait() {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::per_minute(5, clock.clone());

        for _ in 0..5 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(limiter.acquire().await, Duration::from_secs(60));
        assert_eq!(clock.total_slept(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_elapsed_time_frees_slots() {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::new(1, Duration::from_secs(12), clock.clone());

        limiter.acquire().await;
        clock.advance(Duration::from_secs(5));
        assert_eq!(limiter.acquire().await, Duration::from_secs(7));

        clock.advance(Duration::from_secs(30));
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[test]
    fn test_zero_quota_is_clamped() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1), Arc::new(TokioClock));
        assert_eq!(limiter.max_requests, 1);
    }
}
