//! Core traits shared by every persisted entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Primary key type
pub type Id = Uuid;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Trait for entities that belong to exactly one organization (tenant)
pub trait OrganizationScoped {
    fn organization_id(&self) -> Id;

    fn belongs_to(&self, organization_id: Id) -> bool {
        self.organization_id() == organization_id
    }
}
