//! Account service for registration, authentication, and account management

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::account::{
    Account, AccountId, AccountProfile, AccountRepository, AccountRole, normalize_email,
    validate_email, validate_password,
};
use crate::domain::authorization;
use crate::domain::plan::SubscriptionPlan;
use crate::infrastructure::billing::BillingClient;
use crate::infrastructure::team::MembershipStore;

use super::password::PasswordHasher;

/// Request for registering a new owner account
#[derive(Debug, Clone)]
pub struct RegisterOwnerRequest {
    pub email: String,
    pub password: String,
    /// Billing-provider price lookup key; unrecognized keys register on
    /// the free tier
    pub plan_lookup_key: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Account service
#[derive(Debug)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    memberships: Arc<MembershipStore>,
    hasher: Arc<dyn PasswordHasher>,
    billing: Arc<dyn BillingClient>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        memberships: Arc<MembershipStore>,
        hasher: Arc<dyn PasswordHasher>,
        billing: Arc<dyn BillingClient>,
    ) -> Self {
        Self {
            accounts,
            memberships,
            hasher,
            billing,
        }
    }

    /// Register a new plan-paying owner account.
    ///
    /// A billing customer is provisioned up front so that webhook events
    /// can be matched to the account from the first checkout onward.
    pub async fn register_owner(
        &self,
        request: RegisterOwnerRequest,
    ) -> Result<Account, DomainError> {
        let email = normalize_email(&request.email);
        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.accounts.email_exists(&email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let plan = request
            .plan_lookup_key
            .as_deref()
            .map(SubscriptionPlan::from_lookup_key)
            .unwrap_or_default();

        let password_hash = self.hasher.hash(&request.password)?;
        let customer_id = self.billing.create_customer(&email, plan).await?;

        let account = Account::new_owner(&email, password_hash, plan, Some(customer_id))?
            .with_profile(AccountProfile {
                username: request.username,
                first_name: request.first_name,
                last_name: request.last_name,
            });

        let account = self.accounts.create(account).await?;
        info!(account_id = %account.id(), %plan, "Registered owner account");

        Ok(account)
    }

    /// Authenticate with email and password.
    ///
    /// Accounts provisioned by invite cannot log in until password setup
    /// completes; that case is reported distinctly so clients can route
    /// the user to setup instead of showing a bad-credentials error.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let email = normalize_email(email);

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if account.needs_password_setup() {
            return Err(DomainError::PasswordSetupRequired);
        }

        let hash = account
            .password_hash()
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.hasher.verify(password, hash) {
            return Err(DomainError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Complete password setup for an invite-provisioned account.
    ///
    /// Only valid while the account has no credential; afterwards password
    /// changes require authentication.
    pub async fn set_password(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let email = normalize_email(email);
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", email)))?;

        if !account.needs_password_setup() {
            return Err(DomainError::conflict(
                "Password is already set for this account",
            ));
        }

        let hash = self.hasher.hash(password)?;
        account.set_password_hash(hash);

        let account = self.accounts.update(&account).await?;
        info!(account_id = %account.id(), "Completed password setup");

        Ok(account)
    }

    /// Get an account by ID
    pub async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        self.accounts.get(id).await
    }

    /// List the accounts in the actor's cohort: the owner plus its
    /// seat-holders. Restricted to owners and admins.
    pub async fn list_cohort(&self, actor: &Account) -> Result<Vec<Account>, DomainError> {
        if !authorization::can_list_accounts(actor) {
            return Err(DomainError::forbidden(
                "Only owners and admins may list accounts",
            ));
        }

        let owner_id = self.cohort_owner_id(actor)?;
        let accounts = self.accounts.list().await?;

        Ok(accounts
            .into_iter()
            .filter(|a| a.id() == &owner_id || a.is_seat_holder_of(&owner_id))
            .collect())
    }

    /// Change the platform-level role of a seat-holder account
    pub async fn change_role(
        &self,
        actor: &Account,
        target_id: &AccountId,
        new_role: AccountRole,
    ) -> Result<Account, DomainError> {
        let mut target = self
            .accounts
            .get(target_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", target_id)))?;

        if !authorization::can_change_account_role(actor, &target, new_role) {
            return Err(DomainError::forbidden(
                "Not allowed to change this account's role",
            ));
        }

        target.set_role(new_role);
        let target = self.accounts.update(&target).await?;

        info!(account_id = %target.id(), role = %new_role, "Changed account role");
        Ok(target)
    }

    /// Delete a seat-holder account, removing all its team memberships
    /// and freeing its seat.
    pub async fn delete_account(
        &self,
        actor: &Account,
        target_id: &AccountId,
    ) -> Result<(), DomainError> {
        let target = self
            .accounts
            .get(target_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", target_id)))?;

        if !authorization::can_delete_account(actor, &target) {
            return Err(DomainError::forbidden("Not allowed to delete this account"));
        }

        let removed = self.memberships.delete_for_account(target_id).await?;
        self.accounts.delete(target_id).await?;

        info!(
            account_id = %target_id,
            memberships_removed = removed,
            "Deleted account"
        );

        Ok(())
    }

    fn cohort_owner_id(&self, actor: &Account) -> Result<AccountId, DomainError> {
        if actor.is_owner() {
            Ok(actor.id().clone())
        } else {
            actor
                .owner_account_id()
                .cloned()
                .ok_or_else(|| DomainError::forbidden("Account is not linked to an owner"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::account::password::Argon2Hasher;
    use crate::infrastructure::account::repository::InMemoryAccountRepository;
    use crate::infrastructure::billing::LocalBillingClient;
    use crate::infrastructure::storage::InMemoryStorage;

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(MembershipStore::new(Arc::new(InMemoryStorage::new()))),
            Arc::new(Argon2Hasher::new()),
            Arc::new(LocalBillingClient::new()),
        )
    }

    fn register_request(email: &str) -> RegisterOwnerRequest {
        RegisterOwnerRequest {
            email: email.to_string(),
            password: "secure_password123".to_string(),
            plan_lookup_key: Some("hobby_monthly".to_string()),
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_register_owner() {
        let service = service();

        let account = service
            .register_owner(register_request("Owner@Example.com"))
            .await
            .unwrap();

        assert_eq!(account.email(), "owner@example.com");
        assert_eq!(account.role(), AccountRole::Owner);
        assert_eq!(account.subscription_plan(), SubscriptionPlan::Hobby);
        assert!(account.billing_customer_id().is_some());
    }

    #[tokio::test]
    async fn test_register_uses_billing_customer_id_from_provider() {
        use crate::infrastructure::billing::MockBillingClient;

        let mut billing = MockBillingClient::new();
        billing
            .expect_create_customer()
            .withf(|email, plan| email == "owner@example.com" && *plan == SubscriptionPlan::Hobby)
            .times(1)
            .returning(|_, _| Ok("cus_from_provider".to_string()));

        let service = AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(MembershipStore::new(Arc::new(InMemoryStorage::new()))),
            Arc::new(Argon2Hasher::new()),
            Arc::new(billing),
        );

        let account = service
            .register_owner(register_request("owner@example.com"))
            .await
            .unwrap();

        assert_eq!(account.billing_customer_id(), Some("cus_from_provider"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();

        service
            .register_owner(register_request("dup@example.com"))
            .await
            .unwrap();
        let result = service
            .register_owner(register_request("dup@example.com"))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let service = service();
        let mut request = register_request("short@example.com");
        request.password = "short".to_string();

        let result = service.register_owner(request).await;
        assert!(matches!(
            result.unwrap_err(),
            DomainError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = service();
        service
            .register_owner(register_request("owner@example.com"))
            .await
            .unwrap();

        let account = service
            .login("owner@example.com", "secure_password123")
            .await
            .unwrap();
        assert_eq!(account.email(), "owner@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service();
        service
            .register_owner(register_request("owner@example.com"))
            .await
            .unwrap();

        let result = service.login("owner@example.com", "wrong_password").await;
        assert!(matches!(
            result.unwrap_err(),
            DomainError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let service = service();

        let result = service.login("nobody@example.com", "whatever123").await;
        assert!(matches!(
            result.unwrap_err(),
            DomainError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_login_before_password_setup() {
        let service = service();
        let invited = Account::new_invited("invitee@example.com", AccountRole::Viewer).unwrap();
        service.accounts.create(invited).await.unwrap();

        let result = service.login("invitee@example.com", "anything123").await;
        assert!(matches!(
            result.unwrap_err(),
            DomainError::PasswordSetupRequired
        ));
    }

    #[tokio::test]
    async fn test_set_password_then_login() {
        let service = service();
        let invited = Account::new_invited("invitee@example.com", AccountRole::Viewer).unwrap();
        service.accounts.create(invited).await.unwrap();

        service
            .set_password("Invitee@Example.com", "fresh_password123")
            .await
            .unwrap();

        let account = service
            .login("invitee@example.com", "fresh_password123")
            .await
            .unwrap();
        assert!(!account.needs_password_setup());
    }

    #[tokio::test]
    async fn test_set_password_rejected_when_already_set() {
        let service = service();
        service
            .register_owner(register_request("owner@example.com"))
            .await
            .unwrap();

        let result = service
            .set_password("owner@example.com", "another_password123")
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Conflict { .. }));
    }

    async fn owner_with_member(service: &AccountService) -> (Account, Account) {
        let owner = service
            .register_owner(register_request("owner@example.com"))
            .await
            .unwrap();

        let mut member = Account::new_invited("member@example.com", AccountRole::Viewer).unwrap();
        member.link_to_owner(owner.id().clone(), None);
        let member = service.accounts.create(member).await.unwrap();

        (owner, member)
    }

    #[tokio::test]
    async fn test_change_role() {
        let service = service();
        let (owner, member) = owner_with_member(&service).await;

        let updated = service
            .change_role(&owner, member.id(), AccountRole::Researcher)
            .await
            .unwrap();
        assert_eq!(updated.role(), AccountRole::Researcher);
    }

    #[tokio::test]
    async fn test_change_role_to_owner_is_forbidden() {
        let service = service();
        let (owner, member) = owner_with_member(&service).await;

        let result = service
            .change_role(&owner, member.id(), AccountRole::Owner)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_member_cannot_change_roles() {
        let service = service();
        let (owner, member) = owner_with_member(&service).await;

        let result = service
            .change_role(&member, owner.id(), AccountRole::Viewer)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let service = service();
        let (owner, member) = owner_with_member(&service).await;

        service.delete_account(&owner, member.id()).await.unwrap();
        assert!(service.get(member.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_owner_cannot_delete_self() {
        let service = service();
        let (owner, _) = owner_with_member(&service).await;

        let result = service.delete_account(&owner, owner.id()).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_list_cohort() {
        let service = service();
        let (owner, member) = owner_with_member(&service).await;

        // An unrelated owner should not appear in the cohort
        service
            .register_owner(register_request("other@example.com"))
            .await
            .unwrap();

        let cohort = service.list_cohort(&owner).await.unwrap();
        assert_eq!(cohort.len(), 2);
        assert!(cohort.iter().any(|a| a.id() == owner.id()));
        assert!(cohort.iter().any(|a| a.id() == member.id()));
    }

    #[tokio::test]
    async fn test_viewer_cannot_list_cohort() {
        let service = service();
        let (_, member) = owner_with_member(&service).await;

        let result = service.list_cohort(&member).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }
}
