// ============================================================================
// Order Domain - Placement, price recomputation and the status ledger
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, ItemRef, price arithmetic)
// - Records (Order, OrderStatusRecord)
// - Commands (PlaceOrder, UpdateOrderStatus)
// - Errors (OrderError enum)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod command_handler;
pub mod commands;
pub mod errors;
pub mod model;
pub mod value_objects;

// Re-export for convenience
pub use command_handler::*;
pub use commands::*;
pub use errors::*;
pub use model::*;
pub use value_objects::*;
