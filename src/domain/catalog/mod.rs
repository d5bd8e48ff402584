// ============================================================================
// Catalog Domain - Menu items and their prices
// ============================================================================

pub mod errors;
pub mod model;
pub mod service;

pub use errors::*;
pub use model::*;
