use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::config::DEFAULT_RATE_LIMIT;

/// Minimum spacing between outbound requests.
///
/// Clones share one budget. The wait, the request itself and the timestamp
/// update run under one lock, and the timestamp is taken once the request
/// completes, so a slow request pushes the next one back.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT)
    }
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                tracing::debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Rate limiting Scryfall request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let output = request.await;
        *last_request = Some(Instant::now());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let before = Instant::now();
        let started = limiter.run(async { Instant::now() }).await;
        assert_eq!(started, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_requests_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        let first = limiter.run(async { Instant::now() }).await;
        let second = limiter.run(async { Instant::now() }).await;

        assert!(second - first >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_counts_from_request_completion() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        let first_finished = limiter
            .run(async {
                tokio::time::sleep(Duration::from_millis(250)).await;
                Instant::now()
            })
            .await;
        let second_started = limiter.run(async { Instant::now() }).await;

        assert!(second_started - first_finished >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_one_budget() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let other = limiter.clone();

        let a = tokio::spawn(async move { limiter.run(async { Instant::now() }).await });
        let b = tokio::spawn(async move { other.run(async { Instant::now() }).await });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let gap = if a > b { a - b } else { b - a };
        assert!(gap >= Duration::from_millis(100));
    }
}
