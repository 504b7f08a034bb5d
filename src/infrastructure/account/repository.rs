//! In-memory account repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::account::{Account, AccountId, AccountRepository};

/// Thread-safe in-memory account repository.
///
/// Accounts get a dedicated repository instead of the generic storage
/// layer so that lookups by email and billing customer id stay cheap and
/// the credential hash (excluded from serialization) is never lost.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(accounts.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(accounts.values().find(|a| a.email() == email).cloned())
    }

    async fn get_by_billing_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Account>, DomainError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(accounts
            .values()
            .find(|a| a.billing_customer_id() == Some(customer_id))
            .cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if accounts.contains_key(account.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "Account '{}' already exists",
                account.id()
            )));
        }

        if accounts.values().any(|a| a.email() == account.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                account.email()
            )));
        }

        accounts.insert(account.id().as_str().to_string(), account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if !accounts.contains_key(account.id().as_str()) {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        accounts.insert(account.id().as_str().to_string(), account.clone());
        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(accounts.remove(id.as_str()).is_some())
    }

    async fn list(&self) -> Result<Vec<Account>, DomainError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(accounts.values().cloned().collect())
    }

    async fn count_seat_holders(&self, owner_id: &AccountId) -> Result<usize, DomainError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(accounts
            .values()
            .filter(|a| a.is_seat_holder_of(owner_id))
            .count())
    }
}
