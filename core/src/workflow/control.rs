// xihu_core/src/workflow/control.rs

/// Returned by a step handler to say whether the workflow goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  /// Halt the run. Later steps are not executed and the run reports `Stopped`.
  Stop,
}

/// How a workflow run ended when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
  Completed,
  Stopped,
}
