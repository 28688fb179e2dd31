use std::fmt::Debug;

use log::Level;
use tether_core::Observer;

/// Logs every solver event at a fixed level and never intervenes.
///
/// Events are written with their `Debug` representation under the
/// `tether_observers` target, numbered in the order they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogObserver {
    level: Level,
    count: usize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

impl LogObserver {
    /// Creates an observer logging at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level, count: 0 }
    }

    /// Returns the level events are logged at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the number of events seen so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<E: Debug, A> Observer<E, A> for LogObserver {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.count += 1;
        log::log!(self.level, "event {}: {event:?}", self.count);
        None
    }
}
