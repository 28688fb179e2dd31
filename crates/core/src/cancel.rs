use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cooperative cancellation signal shared between a host and a solve.
///
/// Cloning a token shares the underlying flag, so the host thread can keep
/// one clone and hand another to the worker running the optimizer.
/// Cancellation is only ever observed at well-defined points (the start of
/// each evaluation and of each gradient partial); nothing is aborted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The force-stop capability an optimizer exposes to the objective it drives.
///
/// The optimizer owns the handle and checks [`StopHandle::is_stopped`]
/// between evaluations; the objective wrapper calls
/// [`StopHandle::force_stop`] directly when it notices a cancellation or an
/// unusable input, instead of unwinding through the optimizer.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a handle in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the optimizer to stop at its next check.
    pub fn force_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once a stop has been forced.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
