//! Fixed-window request rate limiting.
//!
//! One counter per client identity. A window opens on the first request and
//! admits up to `max_requests`; once the window length has elapsed the next
//! request opens a fresh window. The limiter is shared across handlers via
//! `AppState` and is safe for concurrent use.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A client's current window: when it opened and how many requests it has
/// admitted.
#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by client identity.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per `window` per client.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Records a request for `client` and returns whether it is admitted.
    pub fn try_acquire(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut opened_fresh = false;

        let admitted = {
            let mut entry = self.windows.entry(client.to_string()).or_insert_with(|| {
                opened_fresh = true;
                Window {
                    opened_at: now,
                    count: 0,
                }
            });

            if now.duration_since(entry.opened_at) >= self.window {
                entry.opened_at = now;
                entry.count = 0;
                opened_fresh = true;
            }

            if entry.count >= self.max_requests {
                false
            } else {
                entry.count += 1;
                true
            }
        };

        // Window rollovers double as sweep points, so entries for clients
        // that stopped sending requests do not accumulate forever. The
        // entry guard above must be dropped before retain takes the shard
        // locks.
        if opened_fresh {
            self.windows
                .retain(|key, w| key == client || now.duration_since(w.opened_at) < self.window);
        }

        admitted
    }

    /// Maximum requests admitted per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_acquire("client-a"));
        assert!(limiter.try_acquire("client-a"));
        assert!(limiter.try_acquire("client-a"));
        assert!(!limiter.try_acquire("client-a"));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire("client-a"));
        assert!(!limiter.try_acquire("client-a"));
        assert!(limiter.try_acquire("client-b"));
    }

    #[test]
    fn test_fresh_window_admits_again() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.try_acquire("client-a"));
        assert!(!limiter.try_acquire("client-a"));

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.try_acquire("client-a"));
        assert!(!limiter.try_acquire("client-a"));
    }

    #[test]
    fn test_stale_windows_are_evicted() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.try_acquire("client-a"));
        assert!(limiter.try_acquire("client-b"));
        assert_eq!(limiter.windows.len(), 2);

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.try_acquire("client-b"));

        assert!(!limiter.windows.contains_key("client-a"));
        assert!(limiter.windows.contains_key("client-b"));
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert!(!limiter.try_acquire("client-a"));
    }
}
