use std::sync::{Arc, OnceLock};

use crate::error::AppResult;
use crate::store::{StoreError, UnitOfWork, USERS_EMAIL_KEY};

use super::errors::AccountError;
use super::model::{Account, AccountDraft, Credentials, NewAccount};
use super::password::CredentialHasher;

// ============================================================================
// Account Service
// ============================================================================

/// Verified against when the login name is unknown.
const DECOY_PASSWORD: &str = "decoy-password";

#[derive(Clone)]
pub struct AccountService {
    hasher: Arc<dyn CredentialHasher>,
    decoy_hash: Arc<OnceLock<String>>,
}

impl AccountService {
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            hasher,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    pub async fn register(&self, uow: &mut dyn UnitOfWork, draft: AccountDraft) -> AppResult<Account> {
        let draft = draft.validate()?;

        if uow.find_account_by_name(draft.user_name.as_str()).await?.is_some() {
            return Err(AccountError::NameTaken(draft.user_name.into_inner()).into());
        }

        let record = NewAccount {
            password_hash: self.hash(draft.password).await?,
            user_name: draft.user_name.into_inner(),
            email: draft.email.into_inner(),
        };

        // A concurrent registration can still win the race for the name.
        let account = uow
            .insert_account(&record)
            .await
            .map_err(|err| uniqueness_conflict(err, &record))?;

        tracing::info!(user_id = account.id, user_name = %account.user_name, "Registered user");
        Ok(account)
    }

    pub async fn get(&self, uow: &mut dyn UnitOfWork, id: i64) -> AppResult<Account> {
        let account = uow.find_account(id).await?.ok_or(AccountError::NotFound(id))?;
        Ok(account)
    }

    /// Overwrites name, email and password. The password is re-hashed even
    /// when it has not changed.
    pub async fn update(
        &self,
        uow: &mut dyn UnitOfWork,
        id: i64,
        draft: AccountDraft,
    ) -> AppResult<Account> {
        let draft = draft.validate()?;

        if uow.find_account(id).await?.is_none() {
            return Err(AccountError::NotFound(id).into());
        }

        let record = NewAccount {
            password_hash: self.hash(draft.password).await?,
            user_name: draft.user_name.into_inner(),
            email: draft.email.into_inner(),
        };

        let account = uow
            .update_account(id, &record)
            .await
            .map_err(|err| uniqueness_conflict(err, &record))?
            .ok_or(AccountError::NotFound(id))?;

        tracing::info!(user_id = id, "Updated user profile");
        Ok(account)
    }

    pub async fn delete(&self, uow: &mut dyn UnitOfWork, id: i64) -> AppResult<()> {
        if !uow.delete_account(id).await? {
            return Err(AccountError::NotFound(id).into());
        }

        tracing::info!(user_id = id, "Deleted user and their orders");
        Ok(())
    }

    /// Unknown names and wrong passwords fail identically. An unknown name
    /// still pays for one verification, against a decoy hash.
    pub async fn authenticate(
        &self,
        uow: &mut dyn UnitOfWork,
        credentials: Credentials,
    ) -> AppResult<Account> {
        let account = uow.find_account_by_name(credentials.user_name.trim()).await?;

        let hasher = self.hasher.clone();
        let decoy_hash = self.decoy_hash.clone();
        let stored_hash = account.as_ref().map(|account| account.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || {
            let hash = match &stored_hash {
                Some(hash) => hash.as_str(),
                None => decoy_hash.get_or_init(|| decoy(hasher.as_ref())).as_str(),
            };
            hasher.verify(&credentials.password, hash)
        })
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?;

        match account {
            Some(account) if verified => {
                tracing::info!(user_id = account.id, "Login succeeded");
                Ok(account)
            }
            _ => {
                tracing::debug!("Login rejected");
                Err(AccountError::InvalidCredentials.into())
            }
        }
    }

    async fn hash(&self, raw_password: String) -> Result<String, AccountError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&raw_password))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
    }
}

fn decoy(hasher: &dyn CredentialHasher) -> String {
    hasher.hash(DECOY_PASSWORD).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Could not build decoy credential hash");
        String::new()
    })
}

fn uniqueness_conflict(err: StoreError, record: &NewAccount) -> crate::error::AppError {
    match err {
        StoreError::UniqueViolation(constraint) if constraint == USERS_EMAIL_KEY => {
            AccountError::EmailTaken(record.email.clone()).into()
        }
        StoreError::UniqueViolation(_) => AccountError::NameTaken(record.user_name.clone()).into(),
        other => other.into(),
    }
}
