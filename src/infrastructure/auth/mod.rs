//! Authentication infrastructure - JWT issuance and validation

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtService};
