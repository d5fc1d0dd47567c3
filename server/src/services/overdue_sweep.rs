// server/src/services/overdue_sweep.rs

//! Periodic job that flips unpaid bills past their due date to overdue.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use xihu_core::modules::OverdueBills;
use xihu_core::LedgerResult;

#[instrument(name = "overdue_sweep::run_once", skip(bills))]
pub async fn run_once(bills: &dyn OverdueBills, today: NaiveDate) -> LedgerResult<u64> {
  let changed = bills.mark_overdue(today).await?;
  info!(changed, "Overdue bill sweep finished.");
  Ok(changed)
}

/// Runs the sweep immediately, then every `every`. Failures are logged and the
/// next tick tries again.
pub fn spawn(bills: Arc<dyn OverdueBills>, every: Duration) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      if let Err(e) = run_once(bills.as_ref(), Utc::now().date_naive()).await {
        error!(error = %e, "Overdue bill sweep failed.");
      }
    }
  })
}
