//! Named guest timers for `time_start` / `time_end`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Console {
    timers: HashMap<String, Instant>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer `label`.
    pub fn time_start(&mut self, label: &str) {
        self.timers.insert(label.to_string(), Instant::now());
    }

    /// Stop the timer `label` and return how long it ran. `None` if it was
    /// never started or has already ended.
    pub fn time_end(&mut self, label: &str) -> Option<Duration> {
        self.timers.remove(label).map(|started| started.elapsed())
    }

    pub fn running(&self) -> usize {
        self.timers.len()
    }
}
