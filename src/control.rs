// Control plane: admission control for the HTTP surface
//
// Bounds concurrent route and swap orchestrations and smooths bursts with a
// one-second sliding-window rate limit
//
// Numan Thabit 2025 Nov

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

const RATE_POLL: Duration = Duration::from_millis(5);

#[derive(Clone)]
pub struct AdmissionControl {
    inflight: Arc<Semaphore>,
    limiter: Arc<Mutex<RateLimiter>>,
}

struct RateLimiter {
    rate_per_sec: u32,
    admitted: VecDeque<Instant>,
    window: Duration,
}

impl RateLimiter {
    fn try_admit(&mut self, now: Instant) -> bool {
        while let Some(front) = self.admitted.front() {
            if now.duration_since(*front) > self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
        if (self.admitted.len() as u32) < self.rate_per_sec {
            self.admitted.push_back(now);
            true
        } else {
            false
        }
    }
}

impl AdmissionControl {
    pub fn new(max_inflight: usize, rate_per_sec: u32) -> Self {
        let limiter = RateLimiter {
            rate_per_sec,
            admitted: VecDeque::with_capacity(256),
            window: Duration::from_secs(1),
        };
        Self {
            inflight: Arc::new(Semaphore::new(max_inflight)),
            limiter: Arc::new(Mutex::new(limiter)),
        }
    }

    /// Wait for a rate-limit slot and an inflight permit. None once the
    /// control plane has been closed.
    pub async fn acquire(&self) -> Option<AdmissionPermit> {
        loop {
            if self.limiter.lock().await.try_admit(Instant::now()) {
                break;
            }
            debug!("admission rate limited");
            tokio::time::sleep(RATE_POLL).await;
        }
        let permit = self.inflight.clone().acquire_owned().await.ok()?;
        Some(AdmissionPermit { _permit: permit })
    }

    pub fn available(&self) -> usize {
        self.inflight.available_permits()
    }

    /// Stop admitting; waiting callers get None.
    pub fn close(&self) {
        self.inflight.close();
    }
}

pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}
