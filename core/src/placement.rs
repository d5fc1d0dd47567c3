// xihu_core/src/placement.rs

//! Module checkout as a workflow: validate, create the module order, maybe reuse
//! an unpaid ledger row, create the ledger row, then back-link.

use crate::error::{LedgerError, LedgerResult};
use crate::linkage::{back_link_module_order, create_ledger_entry, LedgerEntryRequest};
use crate::model::{ModuleOrder, ModuleOrderRef};
use crate::modules::OrderModule;
use crate::store::LedgerStore;
use crate::workflow::{ContextData, StepControl, Workflow, WorkflowOutcome};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

pub const STEP_VALIDATE_REQUEST: &str = "validate_request";
pub const STEP_INSERT_MODULE_ORDER: &str = "insert_module_order";
pub const STEP_REUSE_UNPAID_LEDGER_ENTRY: &str = "reuse_unpaid_ledger_entry";
pub const STEP_CREATE_LEDGER_ENTRY: &str = "create_ledger_entry";
pub const STEP_BACK_LINK_MODULE_ORDER: &str = "back_link_module_order";

const CHECKOUT_PATH: &str = "/unified-new/payment/checkout";

pub fn checkout_redirect_url(order_no: &str) -> String {
  format!("{}?orderNo={}", CHECKOUT_PATH, order_no)
}

/// State carried between placement steps.
pub struct PlacementContext<M: OrderModule> {
  pub user_id: i64,
  pub request: Option<M::Request>,
  pub module_order: Option<M::Order>,
  pub order_no: Option<String>,
  pub reused: bool,
  pub back_linked: bool,
}

impl<M: OrderModule> PlacementContext<M> {
  pub fn new(user_id: i64, request: M::Request) -> Self {
    Self {
      user_id,
      request: Some(request),
      module_order: None,
      order_no: None,
      reused: false,
      back_linked: false,
    }
  }
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
  pub module_order_id: i64,
  pub module_order_no: Option<String>,
  pub order_no: String,
  pub amount_cents: i64,
  pub back_linked: bool,
  pub reused: bool,
  pub redirect_url: String,
}

pub struct OrderPlacement<M: OrderModule> {
  module: Arc<M>,
  workflow: Workflow<PlacementContext<M>, LedgerError>,
}

impl<M: OrderModule> OrderPlacement<M> {
  pub fn new(module: Arc<M>, ledger: Arc<dyn LedgerStore>) -> Self {
    let mut workflow = Workflow::new(
      format!("place_{}_order", module.order_type().as_str().to_ascii_lowercase()),
      &[
        (STEP_VALIDATE_REQUEST, false),
        (STEP_INSERT_MODULE_ORDER, false),
        (STEP_REUSE_UNPAID_LEDGER_ENTRY, true),
        (STEP_CREATE_LEDGER_ENTRY, false),
        (STEP_BACK_LINK_MODULE_ORDER, false),
      ],
    );

    let m = Arc::clone(&module);
    workflow.on_step(STEP_VALIDATE_REQUEST, move |ctx: ContextData<PlacementContext<M>>| {
      let result = {
        let guard = ctx.read();
        match guard.request.as_ref() {
          Some(request) => m.validate(guard.user_id, request),
          None => Err(LedgerError::validation("order request is missing")),
        }
      };
      async move {
        result?;
        Ok::<_, LedgerError>(StepControl::Continue)
      }
    });

    let m = Arc::clone(&module);
    workflow.on_step(STEP_INSERT_MODULE_ORDER, move |ctx: ContextData<PlacementContext<M>>| {
      let m = Arc::clone(&m);
      async move {
        let (user_id, request) = {
          let mut guard = ctx.write();
          (guard.user_id, guard.request.take())
        };
        let request = request.ok_or_else(|| LedgerError::validation("order request is missing"))?;
        let order = m.create(user_id, request).await?;
        ctx.write().module_order = Some(order);
        Ok::<_, LedgerError>(StepControl::Continue)
      }
    });

    // Only modules that opt in get a handler; for the others the optional step is skipped.
    if module.reuses_unpaid_ledger_entry() {
      let l = Arc::clone(&ledger);
      workflow.on_step(STEP_REUSE_UNPAID_LEDGER_ENTRY, move |ctx: ContextData<PlacementContext<M>>| {
        let l = Arc::clone(&l);
        async move {
          let module_ref = ctx
            .read()
            .module_order
            .as_ref()
            .map(|o| ModuleOrderRef::new(<M::Order as ModuleOrder>::ORDER_TYPE, o.id()));
          let Some(module_ref) = module_ref else {
            return Ok::<_, LedgerError>(StepControl::Continue);
          };
          match l.find_unpaid_for_module(module_ref).await? {
            Some(existing) => {
              info!(order_no = %existing.order_no, "Reusing unpaid ledger row.");
              let mut guard = ctx.write();
              let already_linked = guard
                .module_order
                .as_ref()
                .and_then(|o| o.unified_order_no())
                .map_or(false, |linked| linked == existing.order_no);
              guard.order_no = Some(existing.order_no);
              guard.reused = true;
              guard.back_linked = already_linked;
              Ok(StepControl::Stop)
            }
            None => Ok::<_, LedgerError>(StepControl::Continue),
          }
        }
      });
    }

    let m = Arc::clone(&module);
    let l = Arc::clone(&ledger);
    workflow.on_step(STEP_CREATE_LEDGER_ENTRY, move |ctx: ContextData<PlacementContext<M>>| {
      let request = {
        let guard = ctx.read();
        guard.module_order.as_ref().map(|order| {
          let title = m.ledger_title(order);
          LedgerEntryRequest {
            user_id: guard.user_id,
            order_type: <M::Order as ModuleOrder>::ORDER_TYPE,
            module_ref: Some(ModuleOrderRef::new(<M::Order as ModuleOrder>::ORDER_TYPE, order.id())),
            title: title.title,
            description: title.description,
            total_amount_cents: order.total_amount_cents(),
          }
        })
      };
      let l = Arc::clone(&l);
      async move {
        let request = request.ok_or_else(|| LedgerError::validation("module order was not created"))?;
        let entry = create_ledger_entry(l.as_ref(), request).await?;
        ctx.write().order_no = Some(entry.order_no);
        Ok::<_, LedgerError>(StepControl::Continue)
      }
    });

    let m = Arc::clone(&module);
    workflow.on_step(STEP_BACK_LINK_MODULE_ORDER, move |ctx: ContextData<PlacementContext<M>>| {
      let m = Arc::clone(&m);
      async move {
        let target = {
          let guard = ctx.read();
          guard.module_order.as_ref().map(|o| o.id()).zip(guard.order_no.clone())
        };
        let Some((module_order_id, order_no)) = target else {
          return Err::<StepControl, _>(LedgerError::validation("nothing to back-link"));
        };
        let linked = back_link_module_order(m.as_ref(), module_order_id, &order_no).await;
        let mut guard = ctx.write();
        guard.back_linked = linked;
        if linked {
          if let Some(order) = guard.module_order.as_mut() {
            order.set_unified_order_no(&order_no);
          }
        }
        Ok::<_, LedgerError>(StepControl::Continue)
      }
    });

    Self { module, workflow }
  }

  pub fn workflow(&self) -> &Workflow<PlacementContext<M>, LedgerError> {
    &self.workflow
  }

  /// Runs the placement for one request and reports where the client pays.
  #[instrument(name = "OrderPlacement::place", skip(self, request), fields(order_type = %self.module.order_type()))]
  pub async fn place(&self, user_id: i64, request: M::Request) -> LedgerResult<PlacedOrder> {
    let ctx = ContextData::new(PlacementContext::<M>::new(user_id, request));
    let outcome = self.workflow.run(ctx.clone()).await?;

    let guard = ctx.read();
    let order = guard
      .module_order
      .as_ref()
      .ok_or_else(|| LedgerError::validation("module order was not created"))?;
    let order_no = guard
      .order_no
      .clone()
      .ok_or_else(|| LedgerError::Persistence("ledger row was not created".to_string()))?;

    let placed = PlacedOrder {
      module_order_id: order.id(),
      module_order_no: order.module_order_no().map(str::to_string),
      redirect_url: checkout_redirect_url(&order_no),
      order_no,
      amount_cents: order.total_amount_cents(),
      back_linked: guard.back_linked,
      reused: guard.reused || outcome == WorkflowOutcome::Stopped,
    };
    info!(
      order_no = %placed.order_no,
      module_order_id = placed.module_order_id,
      back_linked = placed.back_linked,
      reused = placed.reused,
      "Order placed."
    );
    Ok(placed)
  }
}
