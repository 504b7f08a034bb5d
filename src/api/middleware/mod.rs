//! Request middleware and extractors

mod account_auth;

pub use account_auth::{RequireAccount, extract_jwt_token};
