//! Account repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Repository trait for account storage
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    /// Get an account by its ID
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Get an account by email (case-insensitive - emails are stored lowercased)
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Get an account by its external billing customer id
    async fn get_by_billing_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Account>, DomainError>;

    /// Create a new account
    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    /// Update an existing account
    async fn update(&self, account: &Account) -> Result<Account, DomainError>;

    /// Delete an account
    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError>;

    /// List all accounts
    async fn list(&self) -> Result<Vec<Account>, DomainError>;

    /// Count seat-holder accounts linked to the given owner.
    ///
    /// The owner itself is never included in the count.
    async fn count_seat_holders(&self, owner_id: &AccountId) -> Result<usize, DomainError>;

    /// Check if an email is already registered
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
