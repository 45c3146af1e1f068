//! Role names carried in access tokens.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_MEMBER: &str = "member";

/// Roles allowed to read team aggregates.
pub const MANAGER_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER];
