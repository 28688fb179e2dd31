use std::sync::mpsc::Sender;

use tether_core::Observer;
use tether_solvers::objective::PhaseUpdate;

use crate::traits::HasObjective;

/// A progress message sent from a running solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// An evaluation entered a new phase.
    Phase(PhaseUpdate),

    /// A solver event carried this objective value.
    Objective {
        /// Number of events seen so far, this one included.
        count: usize,

        /// The objective value, `NaN` if the event had none.
        objective: f64,
    },
}

/// Forwards the objective of every solver event over a channel.
///
/// A disconnected receiver is not an error: the solve keeps running and
/// messages are dropped.
#[derive(Debug, Clone)]
pub struct ProgressObserver {
    sender: Sender<Progress>,
    count: usize,
}

impl ProgressObserver {
    /// Creates an observer sending to `sender`.
    #[must_use]
    pub fn new(sender: Sender<Progress>) -> Self {
        Self { sender, count: 0 }
    }
}

impl<E: HasObjective, A> Observer<E, A> for ProgressObserver {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.count += 1;
        let message = Progress::Objective {
            count: self.count,
            objective: event.objective(),
        };
        if self.sender.send(message).is_err() {
            log::trace!("progress receiver disconnected");
        }
        None
    }
}

/// Returns a progress sink for an objective's context that forwards
/// phase changes over `sender`.
pub fn phase_sink(sender: Sender<Progress>) -> impl FnMut(&PhaseUpdate) + Send + 'static {
    move |update| {
        if sender.send(Progress::Phase(*update)).is_err() {
            log::trace!("progress receiver disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;

    use tether_solvers::{
        EvalKind,
        objective::Phase,
        optimization::step_search::{Action, Event, Point},
    };

    #[test]
    fn forwards_objectives_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut observer = ProgressObserver::new(tx);

        for (i, objective) in [3.0, 2.0].into_iter().enumerate() {
            let point = Point { x: 0.0, objective };
            let event = Event::Evaluated {
                iter: i + 1,
                point,
                best: point,
                improved: true,
                step_size: 1.0,
            };
            let action: Option<Action> = observer.observe(&event);
            assert!(action.is_none());
        }

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Progress::Objective {
                    count: 1,
                    objective: 3.0
                },
                Progress::Objective {
                    count: 2,
                    objective: 2.0
                },
            ]
        );
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut sink = phase_sink(tx);

        sink(&PhaseUpdate {
            evaluation: 0,
            kind: EvalKind::Objective,
            phase: Phase::CallingModel,
            partial: None,
        });
    }
}
