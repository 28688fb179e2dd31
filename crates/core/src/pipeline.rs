use std::time::{Duration, Instant};

use crate::Model;

/// The hooks of an external CAD/FEA integration.
///
/// A pipeline pushes new design variables into the host application
/// ([`Pipeline::update_geometry`]), optionally runs an analysis on the
/// regenerated geometry ([`Pipeline::run_analysis`]), and reads the results
/// back ([`Pipeline::read_results`]). All three calls are synchronous and
/// may fail; failures are surfaced to the optimizer, never retried.
///
/// Use [`PipelineModel`] to drive a pipeline as a [`Model`].
pub trait Pipeline {
    type Input;
    type Geometry;
    type Results;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pushes the input into the host and returns the regenerated geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the update.
    fn update_geometry(&mut self, input: &Self::Input) -> Result<Self::Geometry, Self::Error>;

    /// Runs the analysis (for example, a finite element solve) on the geometry.
    ///
    /// The default does nothing, which suits geometry-only problems.
    ///
    /// # Errors
    ///
    /// Returns an error if the analysis fails or does not converge.
    fn run_analysis(&mut self, _geometry: &Self::Geometry) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Reads the results of the last update (and analysis) back from the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the results cannot be read.
    fn read_results(&mut self, geometry: Self::Geometry) -> Result<Self::Results, Self::Error>;
}

/// Adapts a [`Pipeline`] into a [`Model`].
///
/// Each call runs the three hooks in order and records how long the analysis
/// hook took, which is usually the dominant cost of an evaluation.
#[derive(Debug)]
pub struct PipelineModel<P> {
    pipeline: P,
    last_analysis_time: Option<Duration>,
}

impl<P: Pipeline> PipelineModel<P> {
    /// Wraps a pipeline.
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            last_analysis_time: None,
        }
    }

    /// Returns the duration of the analysis hook in the most recent call.
    ///
    /// `None` until a call has reached the analysis hook.
    #[must_use]
    pub fn last_analysis_time(&self) -> Option<Duration> {
        self.last_analysis_time
    }

    /// Returns the wrapped pipeline.
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Unwraps the pipeline.
    pub fn into_inner(self) -> P {
        self.pipeline
    }
}

impl<P: Pipeline> Model for PipelineModel<P> {
    type Input = P::Input;
    type Output = P::Results;
    type Error = P::Error;

    fn call(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let geometry = self.pipeline.update_geometry(input)?;

        let started = Instant::now();
        let analysed = self.pipeline.run_analysis(&geometry);
        self.last_analysis_time = Some(started.elapsed());
        analysed?;

        self.pipeline.read_results(geometry)
    }
}
