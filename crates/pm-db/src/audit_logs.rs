//! Audit log repository
//!
//! Rows are append-only; a trigger rejects updates.

use pm_core::Id;
use pm_models::{AuditAction, AuditEntityType, AuditLog, ChangeDetails};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::repository::RepositoryResult;

#[derive(Debug, Clone)]
pub struct CreateAuditLogDto {
    pub entity_type: AuditEntityType,
    pub entity_id: Id,
    pub action: AuditAction,
    pub changed_by: Id,
    pub organization_id: Id,
    pub change_details: Option<ChangeDetails>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, dto: CreateAuditLogDto) -> RepositoryResult<AuditLog> {
        let row = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (
                id, entity_type, entity_id, action, changed_by, organization_id,
                change_details, description, ip_address
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(dto.entity_type)
        .bind(dto.entity_id)
        .bind(dto.action)
        .bind(dto.changed_by)
        .bind(dto.organization_id)
        .bind(dto.change_details.map(Json))
        .bind(&dto.description)
        .bind(&dto.ip_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// History of one entity, newest first
    pub async fn list_for_entity(
        &self,
        entity_id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE entity_id = $1 AND organization_id = $2
            ORDER BY timestamp DESC
            "#,
        )
        .bind(entity_id)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
