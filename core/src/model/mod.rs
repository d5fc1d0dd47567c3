// xihu_core/src/model/mod.rs

pub mod line_items;
pub mod module_order;
pub mod module_ref;
pub mod order_type;
pub mod status;
pub mod unified_order;

pub use line_items::{line_subtotal, FoodOrderLine, HotelStayDetail, LineItems, ShopOrderLine};
pub use module_order::ModuleOrder;
pub use module_ref::ModuleOrderRef;
pub use order_type::OrderType;
pub use status::{BillStatus, ModuleStatus, ModuleTransition, PaymentStatus};
pub use unified_order::{LedgerFilter, NewLedgerEntry, OrderStats, UnifiedOrder};
