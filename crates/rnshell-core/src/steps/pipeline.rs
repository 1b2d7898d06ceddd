//! Sequential step execution that halts on the first failure

use super::{ProjectContext, Step, StepOutcome};
use crate::error::StepError;
use thiserror::Error;

/// Receives progress while a pipeline runs
pub trait Reporter {
    fn step_started(&mut self, index: usize, total: usize, step: &Step);
    fn step_finished(&mut self, index: usize, total: usize, step: &Step, outcome: &StepOutcome);
    fn step_failed(&mut self, index: usize, total: usize, step: &Step, error: &StepError);
}

/// Reporter that only emits tracing events
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn step_started(&mut self, index: usize, total: usize, step: &Step) {
        tracing::info!(step = index + 1, total, "{}", step.title());
    }

    fn step_finished(&mut self, index: usize, _total: usize, _step: &Step, outcome: &StepOutcome) {
        tracing::info!(step = index + 1, "{}", outcome.summary);
    }

    fn step_failed(&mut self, index: usize, _total: usize, step: &Step, error: &StepError) {
        tracing::error!(step = index + 1, title = %step.title(), "{}", error);
    }
}

/// The step that stopped a pipeline
#[derive(Debug, Error)]
#[error("step {} of {total} ({title}) failed: {source}", .index + 1)]
pub struct PipelineError {
    pub index: usize,
    pub total: usize,
    pub title: String,
    #[source]
    pub source: StepError,
}

/// Outcomes of a completed pipeline, in step order
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<(String, StepOutcome)>,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order. The first failure stops the run; steps that
    /// already finished are not rolled back.
    pub async fn run(
        &self,
        ctx: &ProjectContext,
        reporter: &mut dyn Reporter,
    ) -> Result<PipelineReport, PipelineError> {
        let total = self.steps.len();
        let mut report = PipelineReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            reporter.step_started(index, total, step);
            match step.run(ctx).await {
                Ok(outcome) => {
                    reporter.step_finished(index, total, step, &outcome);
                    report.outcomes.push((step.title(), outcome));
                }
                Err(source) => {
                    reporter.step_failed(index, total, step, &source);
                    return Err(PipelineError {
                        index,
                        total,
                        title: step.title(),
                        source,
                    });
                }
            }
        }

        Ok(report)
    }
}
