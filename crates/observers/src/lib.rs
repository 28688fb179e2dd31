//! Reusable observers and solve sessions for the Tether framework.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the solvers in `tether-solvers`, plus a [`Session`] that runs
//! a solve on a worker thread so a host can keep responding while the
//! external pipeline grinds through evaluations.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasObjective`], [`CanStopEarly`])
//! - [`LogObserver`] — logs every solver event through the `log` facade
//! - [`ProgressObserver`] — forwards objective values and evaluation
//!   phases over a channel
//! - [`Session`] — a cancellable solve on a dedicated thread
//!
//! [`Observer`]: tether_core::Observer
//! [`HasObjective`]: traits::HasObjective
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod logging;
mod progress;
mod session;

pub use logging::LogObserver;
pub use progress::{Progress, ProgressObserver, phase_sink};
pub use session::{Session, SessionContext, SessionError};
