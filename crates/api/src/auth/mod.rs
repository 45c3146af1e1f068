//! Authentication primitives.
//!
//! Login and token issuance live with the identity provider; this service
//! only validates HS256 access tokens. [`jwt::generate_access_token`] exists
//! for tooling and tests.

pub mod jwt;
