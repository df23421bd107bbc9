//! Organization model (the tenant)

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

text_enum! {
    pub enum Industry {
        It => "IT",
        Finance => "Finance",
        Healthcare => "Healthcare",
        Retail => "Retail",
        Manufacturing => "Manufacturing",
        Education => "Education",
        Other => "Other",
    }
}

impl Default for Industry {
    fn default() -> Self {
        Industry::It
    }
}

/// A tenant. Every other entity is scoped to exactly one organization.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Id,
    pub name: String,
    pub industry: Industry,
    pub admin_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Lowercased name with all whitespace removed.
    ///
    /// Employees registering with an `@<slug>.ac.in` address are granted
    /// the admin role.
    pub fn email_slug(&self) -> String {
        self.name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }

    pub fn summary(&self) -> OrganizationSummary {
        OrganizationSummary {
            id: self.id,
            name: self.name.clone(),
            industry: self.industry,
        }
    }
}

/// The public projection used in listings and embedded in user payloads
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub id: Id,
    pub name: String,
    pub industry: Industry,
}

impl pm_core::Identifiable for Organization {
    fn id(&self) -> Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_slug() {
        let org = Organization {
            id: Id::new_v4(),
            name: "Acme  Labs Inc".into(),
            industry: Industry::default(),
            admin_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(org.email_slug(), "acmelabsinc");
        assert_eq!(org.summary().industry, Industry::It);
    }
}
