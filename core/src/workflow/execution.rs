// xihu_core/src/workflow/execution.rs

use super::definition::Workflow;
use super::{ContextData, StepControl, WorkflowOutcome};
use crate::error::LedgerError;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<LedgerError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged. A required
  /// step without a handler fails with `LedgerError::MissingStepHandler`.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(workflow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<WorkflowOutcome, Err> {
    event!(Level::DEBUG, "Workflow execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "workflow_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      let Some(handler_fn) = self.handlers.get(&step_def.name) else {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handler, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Required step has no handler.");
        return Err(Err::from(LedgerError::MissingStepHandler {
          step_name: step_def.name.clone(),
        }));
      };

      match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          event!(parent: &step_span, Level::INFO, "Workflow stopped by step handler.");
          return Ok(WorkflowOutcome::Stopped);
        }
        Err(e) => {
          event!(parent: &step_span, Level::ERROR, error = %e, "Step handler failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Workflow execution completed.");
    Ok(WorkflowOutcome::Completed)
  }
}
