// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory with its records, validation rules,
// errors and operations. Every operation takes the request's unit of work
// explicitly; none of them commit.
//
// ============================================================================

pub mod account;
pub mod catalog;
pub mod order;
