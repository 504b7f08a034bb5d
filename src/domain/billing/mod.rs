//! Billing domain - subscription lifecycle events from the payment provider

mod event;

pub use event::{SubscriptionEvent, SubscriptionEventKind};
