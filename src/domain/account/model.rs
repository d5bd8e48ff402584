use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::AccountError;
use super::value_objects::{Email, UserName};

// ============================================================================
// Account Records
// ============================================================================

#[derive(Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Row shape written on registration and on every profile update.
#[derive(Clone)]
pub struct NewAccount {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registration / full profile replacement payload.
#[derive(Clone, Deserialize)]
pub struct AccountDraft {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AccountDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDraft")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validated draft, still holding the raw password until it is hashed.
pub struct ValidAccountDraft {
    pub user_name: UserName,
    pub email: Email,
    pub password: String,
}

impl AccountDraft {
    pub fn validate(self) -> Result<ValidAccountDraft, AccountError> {
        let user_name = UserName::parse(self.user_name)?;
        let email = Email::parse(self.email)?;
        if self.password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        Ok(ValidAccountDraft {
            user_name,
            email,
            password: self.password,
        })
    }
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}
