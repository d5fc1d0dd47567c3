// xihu_core/src/workflow/step.rs

use super::{ContextData, StepControl};
use std::future::Future;
use std::pin::Pin;

pub type StepFuture<Err> = Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>;

/// Type-erased step handler. Each call receives its own clone of the shared context.
pub type StepHandler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> StepFuture<Err> + Send + Sync>;

/// A named position in a workflow. An optional step with no handler is skipped;
/// a required one makes the run fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}
