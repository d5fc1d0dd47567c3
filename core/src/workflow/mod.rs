// xihu_core/src/workflow/mod.rs

//! A small step runner modelled on named, ordered phases. Order placement is
//! expressed as one of these workflows.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{StepControl, WorkflowOutcome};
pub use definition::Workflow;
pub use step::{StepDef, StepFuture, StepHandler};
