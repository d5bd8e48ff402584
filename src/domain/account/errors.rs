// ============================================================================
// Account Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("User name already registered: {0}")]
    NameTaken(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("User name cannot be empty")]
    EmptyUserName,

    #[error("User name exceeds {max} characters")]
    UserNameTooLong { max: usize },

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Email exceeds {max} characters")]
    EmailTooLong { max: usize },

    #[error("Password cannot be empty")]
    EmptyPassword,

    /// Same message for unknown users and wrong passwords.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
