use std::{
    io,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
};

use thiserror::Error;

use tether_core::CancelToken;
use tether_solvers::objective::Context;

use crate::progress::{Progress, ProgressObserver, phase_sink};

/// Name of the worker thread running the solve.
const THREAD_NAME: &str = "tether-solve";

/// Errors that can occur while running a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The worker thread could not be started.
    #[error("failed to spawn solve thread")]
    Spawn(#[from] io::Error),

    /// The solve panicked.
    #[error("solve thread panicked")]
    Panicked,
}

/// What the solve closure gets to wire itself up to its session.
#[derive(Debug)]
pub struct SessionContext {
    cancel: CancelToken,
    progress: Sender<Progress>,
}

impl SessionContext {
    /// Returns a clone of the session's cancel token.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns an objective context that observes the session's cancel
    /// token and reports evaluation phases as [`Progress::Phase`].
    #[must_use]
    pub fn context(&self) -> Context {
        Context::new(self.cancel_token()).with_progress(phase_sink(self.progress.clone()))
    }

    /// Returns an observer that reports objectives as [`Progress::Objective`].
    #[must_use]
    pub fn observer(&self) -> ProgressObserver {
        ProgressObserver::new(self.progress.clone())
    }
}

/// A solve running on a dedicated worker thread.
///
/// The host keeps the session to request cancellation, drain progress
/// messages and finally collect the result with [`join`](Self::join).
///
/// # Example
///
/// ```no_run
/// use tether_observers::Session;
///
/// let session = Session::spawn(|ctx| {
///     let cancel = ctx.cancel_token();
///     // Build an objective with `ctx.context()` and run a solver here.
///     cancel.is_cancelled()
/// })?;
///
/// session.cancel();
/// let cancelled = session.join()?;
/// # Ok::<(), tether_observers::SessionError>(())
/// ```
#[derive(Debug)]
pub struct Session<T> {
    handle: JoinHandle<T>,
    cancel: CancelToken,
    progress: Receiver<Progress>,
}

impl<T: Send + 'static> Session<T> {
    /// Starts `solve` on a new worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`] if the thread cannot be created.
    pub fn spawn<F>(solve: F) -> Result<Self, SessionError>
    where
        F: FnOnce(SessionContext) -> T + Send + 'static,
    {
        let cancel = CancelToken::new();
        let (sender, progress) = mpsc::channel();
        let context = SessionContext {
            cancel: cancel.clone(),
            progress: sender,
        };

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || solve(context))?;
        log::debug!("solve session started");

        Ok(Self {
            handle,
            cancel,
            progress,
        })
    }
}

impl<T> Session<T> {
    /// Requests cancellation.
    ///
    /// The solve stops at its next cancellation check, after the model
    /// call in flight (if any) returns.
    pub fn cancel(&self) {
        log::info!("solve session cancellation requested");
        self.cancel.cancel();
    }

    /// Returns the session's cancel token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns the receiving end of the progress channel.
    #[must_use]
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Drains every progress message received so far without blocking.
    pub fn try_progress(&self) -> Vec<Progress> {
        self.progress.try_iter().collect()
    }

    /// Returns `true` once the solve closure has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the solve and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Panicked`] if the solve panicked.
    pub fn join(self) -> Result<T, SessionError> {
        self.handle.join().map_err(|_| SessionError::Panicked)
    }
}
