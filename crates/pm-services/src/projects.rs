//! Audit entries derived from project edits

use pm_core::Id;
use pm_db::UpdateProjectDto;
use pm_models::{AuditAction, AuditEntityType, Project};

use crate::audit::AuditEntry;

/// One `update` entry per audited field the edit actually changes: status
/// and end date.
pub fn update_entries(
    project: &Project,
    dto: &UpdateProjectDto,
    changed_by: Id,
) -> Vec<AuditEntry> {
    let entry = || {
        AuditEntry::new(
            AuditEntityType::Project,
            project.id,
            AuditAction::Update,
            changed_by,
            project.organization_id,
        )
    };
    let title = dto.title.as_deref().unwrap_or(&project.title);
    let mut entries = Vec::new();

    if let Some(status) = dto.status.filter(|s| *s != project.status) {
        entries.push(
            entry()
                .change("status", project.status, status)
                .describe(format!("Updated status for project: {}", title)),
        );
    }

    if let Some(end_date) = dto.end_date.filter(|d| Some(*d) != project.end_date) {
        entries.push(
            entry()
                .change("endDate", project.end_date, end_date)
                .describe(format!("Updated endDate for project: {}", title)),
        );
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use pm_models::{Methodology, Priority, ProjectStatus};
    use serde_json::json;

    fn project() -> Project {
        Project {
            id: Id::new_v4(),
            title: "Apollo".into(),
            description: None,
            client_name: None,
            repository_url: None,
            status: ProjectStatus::Ongoing,
            priority: Priority::Medium,
            technology_stack: vec![],
            methodology: Methodology::Agile,
            requirements: None,
            project_owner: Id::new_v4(),
            assigned_employees: vec![],
            organization_id: Id::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            actual_end_date: None,
            progress: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_changed_fields_are_audited() {
        let project = project();
        let dto = UpdateProjectDto {
            status: Some(ProjectStatus::Ongoing),
            title: Some("Apollo II".into()),
            ..Default::default()
        };
        assert!(update_entries(&project, &dto, Id::new_v4()).is_empty());
    }

    #[test]
    fn test_status_and_end_date_entries() {
        let project = project();
        let dto = UpdateProjectDto {
            status: Some(ProjectStatus::Completed),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };

        let entries = update_entries(&project, &dto, Id::new_v4());
        assert_eq!(entries.len(), 2);

        let status = entries[0].change_details.as_ref().unwrap();
        assert_eq!(status.old_value, json!("ongoing"));
        assert_eq!(status.new_value, json!("completed"));

        let end = entries[1].change_details.as_ref().unwrap();
        assert_eq!(end.field_changed, "endDate");
        assert_eq!(end.old_value, json!(null));
        assert_eq!(end.new_value, json!("2024-12-31"));
        assert_eq!(
            entries[1].description.as_deref(),
            Some("Updated endDate for project: Apollo")
        );
    }
}
