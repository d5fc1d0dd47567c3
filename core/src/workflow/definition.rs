// xihu_core/src/workflow/definition.rs

//! `Workflow<TData, Err>`: an ordered list of named steps with at most one async
//! handler per step.

use super::step::{StepDef, StepHandler};
use super::{ContextData, StepControl};
use crate::error::LedgerError;
use std::collections::HashMap;
use std::future::Future;

pub struct Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<LedgerError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef>,
  pub(crate) handlers: HashMap<String, StepHandler<TData, Err>>,
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<LedgerError> + Send + Sync + 'static,
{
  /// Creates a workflow from `(step_name, optional)` pairs, executed in the given order.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      name: name.into(),
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_handler(&self, step_name: &str) -> bool {
    self.handlers.contains_key(step_name)
  }

  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      // A typo in a step name is a wiring bug, not a runtime condition.
      panic!(
        "Workflow setup error: step '{}' is not defined in workflow '{}'.",
        step_name, self.name
      );
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    self.ensure_step_exists(step_name);
    for step in self.steps.iter_mut().filter(|s| s.name == step_name) {
      step.optional = optional;
    }
  }

  /// Registers the handler for `step_name`, replacing any earlier one.
  ///
  /// The handler may fail with any error convertible into the workflow's `Err`.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: StepHandler<TData, Err> = Box::new(move |ctx: ContextData<TData>| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.handlers.insert(step_name.to_string(), handler);
  }
}
