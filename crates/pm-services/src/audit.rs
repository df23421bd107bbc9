//! Audit recording
//!
//! Changes to projects and tasks are appended to the audit log. A failed
//! write is logged and swallowed; it never fails the request that caused it.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use pm_core::Id;
use pm_db::{AuditLogRepository, CreateAuditLogDto};
use pm_models::{AuditAction, AuditEntityType, ChangeDetails};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit store error: {0}")]
    Store(String),
}

/// One audit entry about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub entity_type: AuditEntityType,
    pub entity_id: Id,
    pub action: AuditAction,
    pub changed_by: Id,
    pub organization_id: Id,
    pub change_details: Option<ChangeDetails>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
}

impl AuditEntry {
    pub fn new(
        entity_type: AuditEntityType,
        entity_id: Id,
        action: AuditAction,
        changed_by: Id,
        organization_id: Id,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            action,
            changed_by,
            organization_id,
            change_details: None,
            description: None,
            ip_address: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the before/after values of a changed field
    pub fn change<O: Serialize, N: Serialize>(mut self, field: &str, old: O, new: N) -> Self {
        self.change_details = Some(ChangeDetails {
            field_changed: field.to_string(),
            old_value: serde_json::to_value(old).unwrap_or_default(),
            new_value: serde_json::to_value(new).unwrap_or_default(),
        });
        self
    }

    pub fn from_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

impl From<AuditEntry> for CreateAuditLogDto {
    fn from(entry: AuditEntry) -> Self {
        Self {
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            action: entry.action,
            changed_by: entry.changed_by,
            organization_id: entry.organization_id,
            change_details: entry.change_details,
            description: entry.description,
            ip_address: entry.ip_address,
        }
    }
}

/// Audit store trait for persistence
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.insert(entry.into())
            .await
            .map(|_| ())
            .map_err(|e| AuditError::Store(e.to_string()))
    }
}

/// Writes audit entries, logging instead of failing
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: AuditEntry) {
        let entity_id = entry.entity_id;
        let action = entry.action;

        if let Err(e) = self.store.append(entry).await {
            tracing::error!(%entity_id, %action, error = %e, "Error creating audit log");
        }
    }

    /// Record several entries in order
    pub async fn record_all(&self, entries: impl IntoIterator<Item = AuditEntry>) {
        for entry in entries {
            self.record(entry).await;
        }
    }
}

/// In-memory audit store for testing
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
    fail: bool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails
    pub fn failing() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        if self.fail {
            return Err(AuditError::Store("store unavailable".into()));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AuditError::Store(e.to_string()))?;
        entries.push(entry);
        Ok(())
    }
}
