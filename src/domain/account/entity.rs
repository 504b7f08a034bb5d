//! Account entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{AccountValidationError, normalize_email, validate_account_id, validate_email};
use crate::domain::plan::{SubscriptionPlan, SubscriptionStatus};
use crate::domain::storage::StorageKey;

/// Account identifier - UUID v4 in hyphenated string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId from an existing string after validation
    pub fn new(id: impl Into<String>) -> Result<Self, AccountValidationError> {
        let id = id.into();
        validate_account_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random AccountId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for AccountId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Platform-level role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Plan-paying owner - full control, billed for seats
    Owner,
    /// Can manage team members and resources
    Admin,
    /// Can create and edit surveys
    Researcher,
    /// Read-only access
    #[default]
    Viewer,
}

impl AccountRole {
    /// Roles that may be granted through invites or role changes.
    ///
    /// Owner is never assignable - ownership is established only at
    /// registration.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Admin | Self::Researcher | Self::Viewer)
    }

    /// Check if this role can see the platform-wide account listing
    pub fn can_list_accounts(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Researcher => write!(f, "researcher"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// Optional profile details captured at registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Account entity
///
/// An account is either a plan-paying owner (`owner_account_id` is None)
/// or a seat-holder counting against the referenced owner's quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    id: AccountId,
    /// Email address, stored lowercased; unique case-insensitively
    email: String,
    /// Argon2 credential hash. None means the account was provisioned by an
    /// invite and must complete password setup before logging in.
    #[serde(skip_serializing, default)]
    password_hash: Option<String>,
    /// Platform-level role
    role: AccountRole,
    /// Billing-responsible owner for seat-holders; None for owners
    owner_account_id: Option<AccountId>,
    /// Subscription tier (meaningful on owner accounts)
    subscription_plan: SubscriptionPlan,
    /// Subscription lifecycle state
    subscription_status: SubscriptionStatus,
    /// External billing customer id, set at registration
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_customer_id: Option<String>,
    /// External billing subscription id, set by webhook or owner linkage
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_subscription_id: Option<String>,
    /// Profile details
    #[serde(default)]
    profile: AccountProfile,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a plan-paying owner account at registration
    pub fn new_owner(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        plan: SubscriptionPlan,
        billing_customer_id: Option<String>,
    ) -> Result<Self, AccountValidationError> {
        let email = normalize_email(&email.into());
        validate_email(&email)?;
        let now = Utc::now();

        Ok(Self {
            id: AccountId::generate(),
            email,
            password_hash: Some(password_hash.into()),
            role: AccountRole::Owner,
            owner_account_id: None,
            subscription_plan: plan,
            subscription_status: SubscriptionStatus::PendingPayment,
            billing_customer_id,
            billing_subscription_id: None,
            profile: AccountProfile::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an account provisioned by invite acceptance.
    ///
    /// No credential yet - the invitee must complete password setup.
    pub fn new_invited(
        email: impl Into<String>,
        role: AccountRole,
    ) -> Result<Self, AccountValidationError> {
        let email = normalize_email(&email.into());
        validate_email(&email)?;
        let now = Utc::now();

        Ok(Self {
            id: AccountId::generate(),
            email,
            password_hash: None,
            role,
            owner_account_id: None,
            subscription_plan: SubscriptionPlan::default(),
            subscription_status: SubscriptionStatus::default(),
            billing_customer_id: None,
            billing_subscription_id: None,
            profile: AccountProfile::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Set profile details (builder pattern)
    pub fn with_profile(mut self, profile: AccountProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Rebuild an account from persisted state. For repository use only.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_stored(
        id: AccountId,
        email: String,
        password_hash: Option<String>,
        role: AccountRole,
        owner_account_id: Option<AccountId>,
        subscription_plan: SubscriptionPlan,
        subscription_status: SubscriptionStatus,
        billing_customer_id: Option<String>,
        billing_subscription_id: Option<String>,
        profile: AccountProfile,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            owner_account_id,
            subscription_plan,
            subscription_status,
            billing_customer_id,
            billing_subscription_id,
            profile,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn role(&self) -> AccountRole {
        self.role
    }

    pub fn owner_account_id(&self) -> Option<&AccountId> {
        self.owner_account_id.as_ref()
    }

    pub fn subscription_plan(&self) -> SubscriptionPlan {
        self.subscription_plan
    }

    pub fn subscription_status(&self) -> SubscriptionStatus {
        self.subscription_status
    }

    pub fn billing_customer_id(&self) -> Option<&str> {
        self.billing_customer_id.as_deref()
    }

    pub fn billing_subscription_id(&self) -> Option<&str> {
        self.billing_subscription_id.as_deref()
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Status checks

    /// Check if the account still has to complete password setup
    pub fn needs_password_setup(&self) -> bool {
        self.password_hash.is_none()
    }

    /// Check if this account pays for its own plan
    pub fn is_owner(&self) -> bool {
        self.role == AccountRole::Owner
    }

    /// Check if this account occupies a seat on the given owner's plan
    pub fn is_seat_holder_of(&self, owner_id: &AccountId) -> bool {
        self.owner_account_id.as_ref() == Some(owner_id)
    }

    // Mutators

    /// Set the credential hash, completing password setup
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = Some(password_hash.into());
        self.touch();
    }

    /// Update the platform-level role
    pub fn set_role(&mut self, role: AccountRole) {
        self.role = role;
        self.touch();
    }

    /// Link this account to a billing-responsible owner as a seat-holder
    pub fn link_to_owner(
        &mut self,
        owner_id: AccountId,
        billing_subscription_id: Option<String>,
    ) {
        self.owner_account_id = Some(owner_id);
        self.billing_subscription_id = billing_subscription_id;
        self.touch();
    }

    /// Apply subscription state delivered by the billing provider
    pub fn apply_subscription(
        &mut self,
        plan: SubscriptionPlan,
        status: SubscriptionStatus,
        billing_subscription_id: impl Into<String>,
    ) {
        self.subscription_plan = plan;
        self.subscription_status = status;
        self.billing_subscription_id = Some(billing_subscription_id.into());
        self.touch();
    }

    /// Downgrade to the free tier after subscription deletion.
    ///
    /// The customer id is kept so replayed events still resolve.
    pub fn downgrade_to_free(&mut self) {
        self.subscription_plan = SubscriptionPlan::Free;
        self.subscription_status = SubscriptionStatus::Inactive;
        self.billing_subscription_id = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Account {
        Account::new_owner(
            "owner@example.com",
            "hashed",
            SubscriptionPlan::Hobby,
            Some("cus_123".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_account_id_generate_is_valid() {
        let id = AccountId::generate();
        assert!(AccountId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_account_id_invalid() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("not-a-uuid").is_err());
    }

    #[test]
    fn test_new_owner() {
        let account = owner();

        assert_eq!(account.email(), "owner@example.com");
        assert_eq!(account.role(), AccountRole::Owner);
        assert!(account.owner_account_id().is_none());
        assert_eq!(account.subscription_plan(), SubscriptionPlan::Hobby);
        assert_eq!(
            account.subscription_status(),
            SubscriptionStatus::PendingPayment
        );
        assert_eq!(account.billing_customer_id(), Some("cus_123"));
        assert!(!account.needs_password_setup());
    }

    #[test]
    fn test_owner_email_is_normalized() {
        let account = Account::new_owner(
            "Owner@Example.COM",
            "hashed",
            SubscriptionPlan::Free,
            None,
        )
        .unwrap();

        assert_eq!(account.email(), "owner@example.com");
    }

    #[test]
    fn test_new_invited_needs_setup() {
        let account = Account::new_invited("invitee@example.com", AccountRole::Researcher).unwrap();

        assert!(account.needs_password_setup());
        assert_eq!(account.role(), AccountRole::Researcher);
        assert!(account.owner_account_id().is_none());
        assert_eq!(account.subscription_plan(), SubscriptionPlan::Free);
    }

    #[test]
    fn test_set_password_completes_setup() {
        let mut account =
            Account::new_invited("invitee@example.com", AccountRole::Viewer).unwrap();

        account.set_password_hash("new-hash");
        assert!(!account.needs_password_setup());
        assert_eq!(account.password_hash(), Some("new-hash"));
    }

    #[test]
    fn test_link_to_owner() {
        let owner = owner();
        let mut invitee =
            Account::new_invited("invitee@example.com", AccountRole::Viewer).unwrap();

        invitee.link_to_owner(owner.id().clone(), Some("sub_42".to_string()));

        assert!(invitee.is_seat_holder_of(owner.id()));
        assert_eq!(invitee.billing_subscription_id(), Some("sub_42"));
    }

    #[test]
    fn test_apply_subscription() {
        let mut account = owner();

        account.apply_subscription(
            SubscriptionPlan::Pro,
            SubscriptionStatus::Active,
            "sub_99",
        );

        assert_eq!(account.subscription_plan(), SubscriptionPlan::Pro);
        assert_eq!(account.subscription_status(), SubscriptionStatus::Active);
        assert_eq!(account.billing_subscription_id(), Some("sub_99"));
    }

    #[test]
    fn test_downgrade_keeps_customer_id() {
        let mut account = owner();
        account.apply_subscription(SubscriptionPlan::Pro, SubscriptionStatus::Active, "sub_99");

        account.downgrade_to_free();

        assert_eq!(account.subscription_plan(), SubscriptionPlan::Free);
        assert_eq!(account.subscription_status(), SubscriptionStatus::Inactive);
        assert!(account.billing_subscription_id().is_none());
        assert_eq!(account.billing_customer_id(), Some("cus_123"));
    }

    #[test]
    fn test_assignable_roles() {
        assert!(!AccountRole::Owner.is_assignable());
        assert!(AccountRole::Admin.is_assignable());
        assert!(AccountRole::Researcher.is_assignable());
        assert!(AccountRole::Viewer.is_assignable());
    }

    #[test]
    fn test_serialization_excludes_password_hash() {
        let account = owner();

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hashed"));
    }
}
