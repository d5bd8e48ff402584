// ============================================================================
// Account Domain - Identity and credentials
// ============================================================================
//
// Accounts are a leaf the order workflow only references by id. Passwords
// are hashed on the way in and never stored, logged or returned.
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod password;
pub mod service;
pub mod value_objects;

pub use errors::*;
pub use model::*;
pub use password::Argon2Hasher;
pub use service::AccountService;
