//! Billing infrastructure - provider client and webhook synchronizer

mod client;
mod synchronizer;

pub use client::{BillingClient, LocalBillingClient};
#[cfg(test)]
pub use client::MockBillingClient;
pub use synchronizer::BillingSynchronizer;
