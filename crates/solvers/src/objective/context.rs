use std::fmt;

use tether_core::{CancelToken, StopHandle};

use crate::point::EvalKind;

/// Stage of an evaluation, reported to the progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Mapping solver variables to model input.
    Initializing,

    /// Waiting on the black-box model.
    CallingModel,

    /// Deriving objective and constraint values from the model output.
    ComputingObjective,

    /// Evaluating perturbed points for the gradient.
    Gradients,

    /// The evaluation finished and was recorded.
    Ended,
}

/// A phase change of the evaluation at `evaluation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseUpdate {
    /// Index the point has (or will have) in the history.
    pub evaluation: usize,

    /// Whether this is the requested point or a gradient perturbation.
    pub kind: EvalKind,

    /// The phase being entered.
    pub phase: Phase,

    /// `(completed, total)` perturbations while computing a gradient.
    pub partial: Option<(usize, usize)>,
}

impl fmt::Display for PhaseUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Initializing => "initializing",
            Phase::CallingModel => "calling model",
            Phase::ComputingObjective => "computing objective",
            Phase::Gradients => "computing gradient",
            Phase::Ended => "done",
        };
        write!(f, "evaluation {}: {phase}", self.evaluation)?;
        if let Some((done, total)) = self.partial {
            write!(f, " ({done}/{total})")?;
        }
        Ok(())
    }
}

type ProgressSink = Box<dyn FnMut(&PhaseUpdate) + Send>;

/// Explicit evaluation context: cancellation, force-stop and progress.
#[derive(Default)]
pub struct Context {
    cancel: CancelToken,
    stop: Option<StopHandle>,
    progress: Option<ProgressSink>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancel", &self.cancel)
            .field("stop", &self.stop)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Context {
    /// Creates a context observing `cancel`.
    #[must_use]
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            stop: None,
            progress: None,
        }
    }

    /// Adds a sink that receives every phase change.
    #[must_use]
    pub fn with_progress<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&PhaseUpdate) + Send + 'static,
    {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub(crate) fn attach_stop(&mut self, handle: StopHandle) {
        self.stop = Some(handle);
    }

    pub(crate) fn detach_stop(&mut self) {
        self.stop = None;
    }

    pub(crate) fn force_stop(&self) {
        if let Some(stop) = &self.stop {
            stop.force_stop();
        }
    }

    /// Force-stops the optimizer if cancellation was requested.
    pub(crate) fn check_cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            self.force_stop();
        }
        cancelled
    }

    pub(crate) fn report(&mut self, update: PhaseUpdate) {
        if let Some(sink) = &mut self.progress {
            sink(&update);
        }
    }
}
