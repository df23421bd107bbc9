//! Designation-based access control
//!
//! Every authenticated request runs as a [`CurrentUser`]. Handlers call the
//! `require_*` guards they need; each failing guard yields a 403 with a
//! fixed message.

use pm_core::{Id, OrganizationScoped, PmError, PmResult};
use pm_models::{Designation, Role, User};
use tracing::debug;

use crate::jwt::Claims;

/// Designations recognised as staff
pub const STAFF_DESIGNATIONS: &[Designation] = &[
    Designation::Manager,
    Designation::BusinessAnalyst,
    Designation::BusinessDevelopment,
    Designation::TeamLead,
    Designation::Developer,
    Designation::DevOps,
    Designation::Tester,
];

/// Client-facing guard messages
pub mod messages {
    pub const NO_TOKEN: &str = "No token, authorization denied";
    pub const INVALID_TOKEN: &str = "Token is not valid";
    pub const MANAGERIAL_ACCESS: &str = "Managerial access required";
    pub const STAFF_ACCESS: &str = "Authorized personnel access required";
    pub const NOT_A_MEMBER: &str = "Not a member of this organization";
}

// ============================================================================
// User Context
// ============================================================================

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Id,
    pub organization_id: Id,
    /// Organization named in the bearer token
    pub token_organization_id: Id,
    pub role: Role,
    pub designation: Designation,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl CurrentUser {
    /// Combine the stored user with the claims of the token it presented.
    pub fn from_user(user: &User, claims: &Claims) -> Self {
        Self {
            id: user.id,
            organization_id: user.organization_id,
            token_organization_id: claims.organization_id,
            role: user.role,
            designation: user.designation,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_manager(&self) -> bool {
        self.designation.is_manager()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Plain employees are restricted to work they are assigned to.
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    /// Admin role or Manager designation
    pub fn has_managerial_access(&self) -> bool {
        self.is_admin() || self.is_manager()
    }

    pub fn require_admin(&self) -> PmResult<()> {
        if self.has_managerial_access() {
            Ok(())
        } else {
            self.deny("admin", messages::MANAGERIAL_ACCESS)
        }
    }

    pub fn require_staff(&self) -> PmResult<()> {
        if STAFF_DESIGNATIONS.contains(&self.designation) || self.is_admin() {
            Ok(())
        } else {
            self.deny("staff", messages::STAFF_ACCESS)
        }
    }

    /// Managers always pass; everyone else needs one of `allowed`.
    pub fn require_designation(&self, allowed: &[Designation]) -> PmResult<()> {
        if self.is_manager() || allowed.contains(&self.designation) {
            return Ok(());
        }
        let names: Vec<&str> = allowed.iter().map(Designation::as_str).collect();
        self.deny(
            "designation",
            &format!(
                "Access denied. This module is restricted to {} designations.",
                names.join(", ")
            ),
        )
    }

    /// The token must have been issued for the user's own organization.
    pub fn require_org_member(&self) -> PmResult<()> {
        if self.organization_id == self.token_organization_id {
            Ok(())
        } else {
            self.deny("organization", messages::NOT_A_MEMBER)
        }
    }

    /// Role `admin` specifically, regardless of designation.
    pub fn require_admin_role(&self, message: &str) -> PmResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            self.deny("admin_role", message)
        }
    }

    /// Entities of other organizations are reported as missing.
    pub fn ensure_same_organization<E: OrganizationScoped>(
        &self,
        entity: &E,
        entity_name: &str,
    ) -> PmResult<()> {
        if entity.belongs_to(self.organization_id) {
            Ok(())
        } else {
            Err(PmError::not_found(entity_name))
        }
    }

    fn deny(&self, guard: &str, message: &str) -> PmResult<()> {
        debug!(user_id = %self.id, designation = %self.designation, guard, "access denied");
        Err(PmError::forbidden(message))
    }
}

// ============================================================================
// Tests
// ============================================================================
