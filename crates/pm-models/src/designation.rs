//! Designations and roles
//!
//! A user's designation is their job title inside the organization; the
//! coarse `Role` is derived from it and decides managerial access.

text_enum! {
    /// Job designation of a user within an organization
    pub enum Designation {
        Manager => "Manager",
        BusinessAnalyst => "Business Analyst",
        BusinessDevelopment => "Business Development",
        TeamLead => "Team Lead",
        Developer => "Developer",
        DevOps => "DevOps",
        Tester => "Tester",
    }
}

impl Default for Designation {
    fn default() -> Self {
        Designation::Developer
    }
}

impl Designation {
    /// Parse a designation, falling back to the default for unknown input.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Designation::Manager)
    }
}

text_enum! {
    pub enum Role {
        Admin => "admin",
        Employee => "employee",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl Role {
    /// Managers are admins; everybody else is an employee.
    pub fn for_designation(designation: Designation) -> Self {
        if designation.is_manager() {
            Role::Admin
        } else {
            Role::Employee
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designation_text() {
        assert_eq!(Designation::BusinessAnalyst.as_str(), "Business Analyst");
        assert_eq!("Team Lead".parse::<Designation>(), Ok(Designation::TeamLead));
        assert!("team lead".parse::<Designation>().is_err());
        assert_eq!(Designation::ALL.len(), 7);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Designation::parse_or_default(Some("DevOps")), Designation::DevOps);
        assert_eq!(Designation::parse_or_default(Some("Wizard")), Designation::Developer);
        assert_eq!(Designation::parse_or_default(None), Designation::Developer);
    }

    #[test]
    fn test_role_sync() {
        assert_eq!(Role::for_designation(Designation::Manager), Role::Admin);
        for designation in Designation::ALL.iter().filter(|d| !d.is_manager()) {
            assert_eq!(Role::for_designation(*designation), Role::Employee);
        }
    }

    #[test]
    fn test_serde_uses_display_text() {
        let json = serde_json::to_string(&Designation::BusinessDevelopment).unwrap();
        assert_eq!(json, "\"Business Development\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
