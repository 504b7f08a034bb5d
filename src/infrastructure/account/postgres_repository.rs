//! PostgreSQL account repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

use crate::domain::DomainError;
use crate::domain::account::{Account, AccountId, AccountProfile, AccountRepository, AccountRole};
use crate::domain::plan::{SubscriptionPlan, SubscriptionStatus};

/// PostgreSQL account repository with dedicated columns.
///
/// Accounts do not go through the generic JSONB storage because the
/// credential hash is excluded from serialization and lookups by email
/// and billing customer id need real indexes.
#[derive(Debug)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensures the accounts table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255),
                role VARCHAR(32) NOT NULL,
                owner_account_id VARCHAR(36),
                subscription_plan VARCHAR(32) NOT NULL,
                subscription_status VARCHAR(32) NOT NULL,
                billing_customer_id VARCHAR(255),
                billing_subscription_id VARCHAR(255),
                profile JSONB NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create accounts table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_accounts_owner ON accounts (owner_account_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create accounts index: {}", e)))?;

        Ok(())
    }

    fn row_to_account(row: &PgRow) -> Result<Account, DomainError> {
        let id: String = row.get("id");
        let id = AccountId::new(id)
            .map_err(|e| DomainError::storage(format!("Corrupt account id in row: {}", e)))?;

        let owner_account_id: Option<String> = row.get("owner_account_id");
        let owner_account_id = owner_account_id
            .map(AccountId::new)
            .transpose()
            .map_err(|e| DomainError::storage(format!("Corrupt owner id in row: {}", e)))?;

        let role: String = row.get("role");
        let plan: String = row.get("subscription_plan");
        let status: String = row.get("subscription_status");

        let profile: serde_json::Value = row.get("profile");
        let profile: AccountProfile = serde_json::from_value(profile)
            .map_err(|e| DomainError::storage(format!("Corrupt profile in row: {}", e)))?;

        let created_at: DateTime<Utc> = row.get("created_at");
        let updated_at: DateTime<Utc> = row.get("updated_at");

        Ok(Account::from_stored(
            id,
            row.get("email"),
            row.get("password_hash"),
            parse_role(&role)?,
            owner_account_id,
            parse_plan(&plan)?,
            parse_status(&status)?,
            row.get("billing_customer_id"),
            row.get("billing_subscription_id"),
            profile,
            created_at,
            updated_at,
        ))
    }
}

fn parse_role(s: &str) -> Result<AccountRole, DomainError> {
    match s {
        "owner" => Ok(AccountRole::Owner),
        "admin" => Ok(AccountRole::Admin),
        "researcher" => Ok(AccountRole::Researcher),
        "viewer" => Ok(AccountRole::Viewer),
        other => Err(DomainError::storage(format!(
            "Unknown account role '{}' in row",
            other
        ))),
    }
}

fn parse_plan(s: &str) -> Result<SubscriptionPlan, DomainError> {
    match s {
        "free" => Ok(SubscriptionPlan::Free),
        "hobby" => Ok(SubscriptionPlan::Hobby),
        "pro" => Ok(SubscriptionPlan::Pro),
        other => Err(DomainError::storage(format!(
            "Unknown subscription plan '{}' in row",
            other
        ))),
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s {
        "pending_payment" => Ok(SubscriptionStatus::PendingPayment),
        "active" => Ok(SubscriptionStatus::Active),
        "inactive" => Ok(SubscriptionStatus::Inactive),
        other => Err(DomainError::storage(format!(
            "Unknown subscription status '{}' in row",
            other
        ))),
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account by email: {}", e)))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn get_by_billing_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE billing_customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get account by customer id: {}", e))
            })?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let profile = serde_json::to_value(account.profile())
            .map_err(|e| DomainError::storage(format!("Failed to serialize profile: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, password_hash, role, owner_account_id,
                subscription_plan, subscription_status,
                billing_customer_id, billing_subscription_id,
                profile, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.password_hash())
        .bind(account.role().to_string())
        .bind(account.owner_account_id().map(|id| id.as_str()))
        .bind(account.subscription_plan().to_string())
        .bind(account.subscription_status().to_string())
        .bind(account.billing_customer_id())
        .bind(account.billing_subscription_id())
        .bind(&profile)
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    account.email()
                ))
            } else {
                DomainError::storage(format!("Failed to create account: {}", e))
            }
        })?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let profile = serde_json::to_value(account.profile())
            .map_err(|e| DomainError::storage(format!("Failed to serialize profile: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, password_hash = $3, role = $4, owner_account_id = $5,
                subscription_plan = $6, subscription_status = $7,
                billing_customer_id = $8, billing_subscription_id = $9,
                profile = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.password_hash())
        .bind(account.role().to_string())
        .bind(account.owner_account_id().map(|id| id.as_str()))
        .bind(account.subscription_plan().to_string())
        .bind(account.subscription_status().to_string())
        .bind(account.billing_customer_id())
        .bind(account.billing_subscription_id())
        .bind(&profile)
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Account>, DomainError> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list accounts: {}", e)))?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn count_seat_holders(&self, owner_id: &AccountId) -> Result<usize, DomainError> {
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM accounts WHERE owner_account_id = $1")
                .bind(owner_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to count seat holders: {}", e))
                })?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("owner").unwrap(), AccountRole::Owner);
        assert_eq!(parse_role("viewer").unwrap(), AccountRole::Viewer);
        assert!(parse_role("superuser").is_err());
    }

    #[test]
    fn test_parse_plan_and_status() {
        assert_eq!(parse_plan("hobby").unwrap(), SubscriptionPlan::Hobby);
        assert!(parse_plan("enterprise").is_err());

        assert_eq!(
            parse_status("pending_payment").unwrap(),
            SubscriptionStatus::PendingPayment
        );
        assert!(parse_status("paused").is_err());
    }
}
