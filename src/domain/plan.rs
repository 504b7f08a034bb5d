//! Subscription plans and seat limits

use serde::{Deserialize, Serialize};

/// Subscription plan tier
///
/// The seat limit table is exhaustive over this enum; adding a tier
/// forces a decision about its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// Free tier - the most restrictive, also the fail-closed default
    #[default]
    Free,
    /// Hobby tier
    Hobby,
    /// Pro tier
    Pro,
}

impl SubscriptionPlan {
    /// Maximum number of seat-holder accounts an owner on this plan may have.
    ///
    /// The owner itself never counts against its own quota.
    pub fn max_seats(&self) -> usize {
        match self {
            Self::Free => 2,
            Self::Hobby => 5,
            Self::Pro => 100,
        }
    }

    /// Resolve a billing-provider price lookup key to a plan.
    ///
    /// Unrecognized keys resolve to the most restrictive tier - the seat
    /// governor must fail closed, never open.
    pub fn from_lookup_key(key: &str) -> Self {
        match key {
            "free_monthly" => Self::Free,
            "hobby_monthly" => Self::Hobby,
            "pro_monthly" => Self::Pro,
            _ => Self::Free,
        }
    }

    /// The billing-provider lookup key for this plan
    pub fn lookup_key(&self) -> &'static str {
        match self {
            Self::Free => "free_monthly",
            Self::Hobby => "hobby_monthly",
            Self::Pro => "pro_monthly",
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Hobby => write!(f, "hobby"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

/// Billing state of an owner account's subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Registered but checkout has not completed
    #[default]
    PendingPayment,
    /// Subscription is paid up
    Active,
    /// Subscription ended or was canceled
    Inactive,
}

impl SubscriptionStatus {
    /// Parse a billing-provider status string.
    ///
    /// Anything that is not a recognized "live" status maps to `Inactive`.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "active" | "trialing" => Self::Active,
            "incomplete" | "pending_payment" => Self::PendingPayment,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}
