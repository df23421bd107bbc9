//! # pm-auth
//!
//! Authentication and authorization for ProManager.
//!
//! ## Features
//!
//! - JWT bearer tokens carrying user id, role and organization
//! - Argon2 password hashing
//! - One-time password reset codes
//! - Designation-based guards on [`CurrentUser`]
//! - Project and task visibility rules

pub mod jwt;
pub mod otp;
pub mod password;
pub mod permissions;
pub mod visibility;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use otp::ResetCode;
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::{messages, CurrentUser, STAFF_DESIGNATIONS};
pub use visibility::{task_categories, ProjectVisibility, TaskVisibility};
