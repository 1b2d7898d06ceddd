//! Pipeline progress rendered with cliclack

use crate::error::StepError;
use crate::steps::{Reporter, Step, StepOutcome};

/// Spinner per step; steps that run a tool log a header instead so the tool's
/// own output stays readable.
#[derive(Default)]
pub struct CliclackReporter {
    spinner: Option<cliclack::ProgressBar>,
}

impl CliclackReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn label(index: usize, total: usize, step: &Step) -> String {
        format!("[{}/{}] {}", index + 1, total, step.title())
    }
}

impl Reporter for CliclackReporter {
    fn step_started(&mut self, index: usize, total: usize, step: &Step) {
        let label = Self::label(index, total, step);
        if step.runs_tool() {
            let _ = cliclack::log::step(label);
        } else {
            let spinner = cliclack::spinner();
            spinner.start(label);
            self.spinner = Some(spinner);
        }
    }

    fn step_finished(&mut self, _index: usize, _total: usize, _step: &Step, outcome: &StepOutcome) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(&outcome.summary),
            None => {
                let _ = cliclack::log::success(&outcome.summary);
            }
        }
        if !outcome.details.is_empty() {
            let _ = cliclack::log::remark(outcome.details.join("\n"));
        }
    }

    fn step_failed(&mut self, index: usize, total: usize, step: &Step, error: &StepError) {
        let message = format!("{} failed", Self::label(index, total, step));
        match self.spinner.take() {
            Some(spinner) => spinner.error(&message),
            None => {
                let _ = cliclack::log::error(&message);
            }
        }
        let _ = cliclack::log::error(error.to_string());
    }
}
