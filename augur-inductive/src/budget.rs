//! Wall-clock budget shared by every detector in one call

use crate::error::TimedOut;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Budget {
    started: Instant,
    limit: Duration,
    interval: usize,
}

impl Budget {
    pub fn start(limit: Duration, interval: usize) -> Self {
        Self {
            started: Instant::now(),
            limit,
            interval: interval.max(1),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail once the limit is reached. A zero limit always fails.
    pub fn check(&self, caller: &'static str) -> Result<(), TimedOut> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.limit {
            warn!(caller, ?elapsed, limit = ?self.limit, "computation budget exhausted");
            return Err(TimedOut {
                caller,
                elapsed,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Loop hook: reads the clock only every `interval` iterations
    #[inline]
    pub fn tick(&self, iteration: usize, caller: &'static str) -> Result<(), TimedOut> {
        if iteration % self.interval == 0 {
            self.check(caller)
        } else {
            Ok(())
        }
    }
}
