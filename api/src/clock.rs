//! Wall-clock source for "today".
//!
//! Handlers read the time through [`Clock`] so tests can pin the day.

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in the server's local timezone.
    fn now(&self) -> DateTime<Local>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}
