// src/lib.rs

//! XiHu order ledger: one `unified_order` table shared by the hotel, food, shop,
//! travel and bill-payment modules.
//!
//!  - `linkage` inserts ledger rows and back-links module orders to them.
//!  - `placement` runs a module checkout as a named-step `Workflow`.
//!  - `checkout` views, pays, cancels, deletes, lists and counts ledger rows.
//!  - `rating` stores reviews and writes the average score back.
//!
//! Storage is behind the traits in `store`; `memory` has in-process versions.

pub mod checkout;
pub mod error;
pub mod linkage;
pub mod memory;
pub mod model;
pub mod modules;
pub mod placement;
pub mod rating;
pub mod store;
pub mod workflow;

pub use crate::checkout::{CheckoutService, CheckoutView, StandaloneOrder};
pub use crate::error::{LedgerError, LedgerResult};
pub use crate::model::{
  LedgerFilter, LineItems, ModuleOrder, ModuleOrderRef, OrderStats, OrderType, PaymentStatus, UnifiedOrder,
};
pub use crate::modules::{ModuleRegistry, OrderModule};
pub use crate::placement::{OrderPlacement, PlacedOrder};
pub use crate::store::{LedgerStore, ModuleOrderStore, ReviewStore};
pub use crate::workflow::{ContextData, StepControl, Workflow, WorkflowOutcome};
