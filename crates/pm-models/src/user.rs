//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;
use validator::Validate;

use crate::designation::{Designation, Role};

/// User entity
///
/// A user belongs to exactly one organization. `role` always follows
/// `designation` except for employees registered with the organization's
/// academic e-mail domain, who are admins regardless of title.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub organization_id: Id,
    pub department: Option<String>,
    pub designation: Designation,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_currently_on_leave: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_password_otp: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User);

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Admin role or Manager designation
    pub fn has_managerial_access(&self) -> bool {
        self.role.is_admin() || self.designation.is_manager()
    }

    /// Whether `otp` is the pending reset code and has not expired.
    pub fn reset_otp_matches(&self, otp: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_password_otp, self.reset_password_expires) {
            (Some(expected), Some(expires)) => expected == otp && expires > now,
            _ => false,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            designation: self.designation,
        }
    }
}

/// Compact projection embedded in other payloads (owners, assignees, authors)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub designation: Designation,
}

/// Attributes of a user about to be created
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    pub username: String,

    #[validate(email(message = "is not a valid e-mail address"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "is required"))]
    pub last_name: String,

    pub designation: Designation,
    pub role: Role,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

impl NewUser {
    /// Username to use when none was supplied: the e-mail's local part when
    /// it is at least three characters long, otherwise the whole address.
    pub fn default_username(email: &str) -> String {
        match email.split('@').next() {
            Some(local) if local.chars().count() >= 3 => local.to_string(),
            _ => email.to_string(),
        }
    }
}
