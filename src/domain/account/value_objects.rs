use serde::{Deserialize, Serialize};

use super::errors::AccountError;

pub const MAX_USER_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 50;

// ============================================================================
// Account Value Objects
// ============================================================================

/// Account email address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(email: impl Into<String>) -> Result<Self, AccountError> {
        let email = email.into().trim().to_string();

        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(AccountError::EmailTooLong { max: MAX_EMAIL_LEN });
        }

        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid || email.contains(char::is_whitespace) {
            return Err(AccountError::InvalidEmail(email));
        }

        Ok(Self(email))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Account login name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn parse(name: impl Into<String>) -> Result<Self, AccountError> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(AccountError::EmptyUserName);
        }
        if name.chars().count() > MAX_USER_NAME_LEN {
            return Err(AccountError::UserNameTooLong { max: MAX_USER_NAME_LEN });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_simple_address() {
        let email = Email::parse(" jane@example.com ").unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_email_rejects_malformed() {
        for raw in ["", "jane", "@example.com", "jane@", "ja ne@example.com", "a@b@c"] {
            assert!(
                matches!(Email::parse(raw), Err(AccountError::InvalidEmail(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_email_rejects_too_long() {
        let raw = format!("{}@example.com", "x".repeat(45));
        assert!(matches!(
            Email::parse(raw),
            Err(AccountError::EmailTooLong { max: 50 })
        ));
    }

    #[test]
    fn test_user_name_rules() {
        assert_eq!(UserName::parse(" jane ").unwrap().as_str(), "jane");
        assert!(matches!(UserName::parse("  "), Err(AccountError::EmptyUserName)));
        assert!(matches!(
            UserName::parse("n".repeat(51)),
            Err(AccountError::UserNameTooLong { max: 50 })
        ));
    }
}
