//! Task repository
//!
//! Database operations for tasks, their comments and the aggregates used
//! by trackers and reports.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use pm_models::{Priority, Task, TaskComment, TaskStatus};
use sqlx::PgPool;

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Row filter for task listings
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub organization_id: Id,
    /// Restrict to tasks assigned to or created by this user...
    pub member: Option<Id>,
    /// ...or filed under one of these categories
    pub categories: Vec<String>,
    pub project_id: Option<Id>,
}

impl TaskFilter {
    pub fn organization(organization_id: Id) -> Self {
        Self {
            organization_id,
            ..Default::default()
        }
    }

    pub fn with_member(mut self, member: Id, categories: &[&str]) -> Self {
        self.member = Some(member);
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_project(mut self, project_id: Option<Id>) -> Self {
        self.project_id = project_id;
        self
    }
}

/// DTO for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskDto {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assigned_employees: Vec<Id>,
    pub assigned_team: Option<Id>,
    pub project_id: Id,
    pub organization_id: Id,
    pub created_by: Id,
    pub due_date: Option<NaiveDate>,
}

/// DTO for updating a task
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub assigned_employees: Option<Vec<Id>>,
    pub assigned_team: Option<Id>,
    pub due_date: Option<NaiveDate>,
}

/// Status breakdown of a set of tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskReportCounts {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub blocked: i64,
    pub overdue: i64,
}

/// Task repository implementation
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Tasks matching `filter`, newest first
    pub async fn list(&self, filter: &TaskFilter) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE organization_id = $1
              AND ($2::uuid IS NULL
                   OR $2 = ANY(assigned_employees)
                   OR created_by = $2
                   OR category = ANY($3))
              AND ($4::uuid IS NULL OR project_id = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.organization_id)
        .bind(filter.member)
        .bind(&filter.categories)
        .bind(filter.project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Tasks of one project, highest priority first, then newest
    pub async fn list_by_project(&self, project_id: Id) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE project_id = $1
            ORDER BY CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                     created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Persist status, completion and block state of a task
    pub async fn save_state(&self, task: &Task) -> RepositoryResult<Task> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                status = $1,
                completed_at = $2,
                is_blocked = $3,
                block_reason = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(task.status)
        .bind(task.completed_at)
        .bind(task.is_blocked)
        .bind(&task.block_reason)
        .bind(task.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Task"))
    }

    /// Add minutes to the logged time.
    ///
    /// `None` when the task is gone or the total would no longer fit the
    /// column; the row is left untouched then.
    pub async fn add_time_spent(&self, id: Id, minutes: i32) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET time_spent = time_spent + $1, updated_at = NOW()
            WHERE id = $2 AND time_spent <= 2147483647 - $1
            RETURNING *
            "#,
        )
        .bind(minutes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Comments on a task, oldest first
    pub async fn comments(&self, task_id: Id) -> RepositoryResult<Vec<TaskComment>> {
        let rows = sqlx::query_as::<_, TaskComment>(
            "SELECT * FROM task_comments WHERE task_id = $1 ORDER BY created_at ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Append a comment and bump the task's `updated_at`
    pub async fn add_comment(
        &self,
        task_id: Id,
        user_id: Id,
        text: &str,
    ) -> RepositoryResult<TaskComment> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            INSERT INTO task_comments (id, task_id, user_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(task_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tasks SET updated_at = NOW() WHERE id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Task counts grouped by status, optionally for one assignee
    pub async fn status_counts(
        &self,
        organization_id: Id,
        assignee: Option<Id>,
    ) -> RepositoryResult<Vec<(TaskStatus, i64)>> {
        let rows = sqlx::query_as::<_, (TaskStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM tasks
            WHERE organization_id = $1 AND ($2::uuid IS NULL OR $2 = ANY(assigned_employees))
            GROUP BY status
            "#,
        )
        .bind(organization_id)
        .bind(assignee)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Task counts grouped by priority, optionally for one assignee
    pub async fn priority_counts(
        &self,
        organization_id: Id,
        assignee: Option<Id>,
    ) -> RepositoryResult<Vec<(Priority, i64)>> {
        let rows = sqlx::query_as::<_, (Priority, i64)>(
            r#"
            SELECT priority, COUNT(*)
            FROM tasks
            WHERE organization_id = $1 AND ($2::uuid IS NULL OR $2 = ANY(assigned_employees))
            GROUP BY priority
            "#,
        )
        .bind(organization_id)
        .bind(assignee)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sum of logged minutes, optionally for one assignee
    pub async fn total_time_spent(
        &self,
        organization_id: Id,
        assignee: Option<Id>,
    ) -> RepositoryResult<i64> {
        let minutes = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(time_spent), 0)::BIGINT
            FROM tasks
            WHERE organization_id = $1 AND ($2::uuid IS NULL OR $2 = ANY(assigned_employees))
            "#,
        )
        .bind(organization_id)
        .bind(assignee)
        .fetch_one(&self.pool)
        .await?;

        Ok(minutes)
    }

    /// Number of an assignee's tasks touched within `[from, to)`
    pub async fn count_updated_between(
        &self,
        assignee: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tasks
            WHERE $1 = ANY(assigned_employees) AND updated_at >= $2 AND updated_at < $3
            "#,
        )
        .bind(assignee)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Status breakdown of an organization's tasks.
    ///
    /// `created` restricts to tasks created within `[from, to)`; `assignee`
    /// to tasks assigned to that user; `today` decides which open tasks are
    /// overdue.
    pub async fn report_counts(
        &self,
        organization_id: Id,
        assignee: Option<Id>,
        created: Option<(DateTime<Utc>, DateTime<Utc>)>,
        today: NaiveDate,
    ) -> RepositoryResult<TaskReportCounts> {
        let (from, to) = created.unzip();
        let counts = sqlx::query_as::<_, TaskReportCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                   COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'todo') AS pending,
                   COUNT(*) FILTER (WHERE status = 'blocked') AS blocked,
                   COUNT(*) FILTER (WHERE status <> 'completed'
                                      AND due_date IS NOT NULL
                                      AND due_date < $5) AS overdue
            FROM tasks
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR $2 = ANY(assigned_employees))
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at < $4)
            "#,
        )
        .bind(organization_id)
        .bind(assignee)
        .bind(from)
        .bind(to)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

#[async_trait]
impl Repository<Task, CreateTaskDto, UpdateTaskDto> for TaskRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateTaskDto) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (
                id, title, description, category, status, priority, assigned_employees,
                assigned_team, project_id, organization_id, created_by, due_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.category)
        .bind(dto.status)
        .bind(dto.priority)
        .bind(&dto.assigned_employees)
        .bind(dto.assigned_team)
        .bind(dto.project_id)
        .bind(dto.organization_id)
        .bind(dto.created_by)
        .bind(dto.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateTaskDto) -> RepositoryResult<Task> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                priority = COALESCE($4, priority),
                assigned_employees = COALESCE($5, assigned_employees),
                assigned_team = COALESCE($6, assigned_team),
                due_date = COALESCE($7, due_date),
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.category)
        .bind(dto.priority)
        .bind(&dto.assigned_employees)
        .bind(dto.assigned_team)
        .bind(dto.due_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Task"))
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Task"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use pm_models::Designation;

    #[test]
    fn test_filter_builder() {
        let org = Id::new_v4();
        let user = Id::new_v4();
        let project = Id::new_v4();

        let filter = TaskFilter::organization(org)
            .with_member(user, &["Bug", "QA"])
            .with_project(Some(project));

        assert_eq!(filter.organization_id, org);
        assert_eq!(filter.member, Some(user));
        assert_eq!(filter.categories, vec!["Bug".to_string(), "QA".to_string()]);
        assert_eq!(filter.project_id, Some(project));
    }

    #[test]
    fn test_unscoped_filter_has_no_member() {
        let filter = TaskFilter::organization(Id::new_v4());
        assert!(filter.member.is_none());
        assert!(filter.categories.is_empty());
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        let mut titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        titles.sort_unstable();
        titles
    }

    #[sqlx::test]
    async fn test_list_admits_assigned_created_and_category(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let tester = test_support::employee(&pool, admin.organization_id, "Tia", Designation::Tester).await;
        let portal = test_support::project(&pool, &admin, "Portal", vec![]).await;

        test_support::task(&pool, &portal, &admin, "Bugs", vec![]).await;
        test_support::task(&pool, &portal, &admin, "QA", vec![]).await;
        test_support::task(&pool, &portal, &admin, "Client", vec![]).await;
        test_support::task(&pool, &portal, &admin, "Assigned", vec![tester.id]).await;
        test_support::task(&pool, &portal, &tester, "Created", vec![]).await;

        let repo = TaskRepository::new(pool.clone());
        let scoped = TaskFilter::organization(admin.organization_id)
            .with_member(tester.id, &["Bug", "QA", "Testing", "Bugs"]);
        let tasks = repo.list(&scoped).await.unwrap();
        assert_eq!(
            titles(&tasks),
            vec!["Assigned work", "Bugs work", "Created work", "QA work"]
        );

        let everything = repo
            .list(&TaskFilter::organization(admin.organization_id))
            .await
            .unwrap();
        assert_eq!(everything.len(), 5);
    }

    #[sqlx::test]
    async fn test_list_without_categories_is_assignment_only(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let dev = test_support::employee(&pool, admin.organization_id, "Dev", Designation::Developer).await;
        let portal = test_support::project(&pool, &admin, "Portal", vec![]).await;

        test_support::task(&pool, &portal, &admin, "General", vec![]).await;
        test_support::task(&pool, &portal, &admin, "Bugs", vec![]).await;
        test_support::task(&pool, &portal, &admin, "Feature", vec![dev.id]).await;

        let filter = TaskFilter::organization(admin.organization_id).with_member(dev.id, &[]);
        let tasks = TaskRepository::new(pool).list(&filter).await.unwrap();
        assert_eq!(titles(&tasks), vec!["Feature work"]);
    }

    #[sqlx::test]
    async fn test_list_narrows_to_project_and_organization(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let rival = test_support::organization(&pool, "rival").await;
        let portal = test_support::project(&pool, &admin, "Portal", vec![]).await;
        let billing = test_support::project(&pool, &admin, "Billing", vec![]).await;
        let secret = test_support::project(&pool, &rival, "Secret", vec![]).await;

        test_support::task(&pool, &portal, &admin, "Portal", vec![]).await;
        test_support::task(&pool, &billing, &admin, "Billing", vec![]).await;
        test_support::task(&pool, &secret, &rival, "Secret", vec![]).await;

        let repo = TaskRepository::new(pool.clone());
        let all = repo
            .list(&TaskFilter::organization(admin.organization_id))
            .await
            .unwrap();
        assert_eq!(titles(&all), vec!["Billing work", "Portal work"]);

        let narrowed = repo
            .list(&TaskFilter::organization(admin.organization_id).with_project(Some(billing.id)))
            .await
            .unwrap();
        assert_eq!(titles(&narrowed), vec!["Billing work"]);

        let foreign = repo
            .list(&TaskFilter::organization(admin.organization_id).with_project(Some(secret.id)))
            .await
            .unwrap();
        assert!(foreign.is_empty());
    }

    #[sqlx::test]
    async fn test_time_spent_stops_at_column_limit(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let portal = test_support::project(&pool, &admin, "Portal", vec![]).await;
        let task = test_support::task(&pool, &portal, &admin, "General", vec![]).await;
        let repo = TaskRepository::new(pool);

        let logged = repo.add_time_spent(task.id, i32::MAX - 5).await.unwrap();
        assert_eq!(logged.map(|t| t.time_spent), Some(i32::MAX - 5));

        assert!(repo.add_time_spent(task.id, 6).await.unwrap().is_none());
        let logged = repo.add_time_spent(task.id, 5).await.unwrap();
        assert_eq!(logged.map(|t| t.time_spent), Some(i32::MAX));
    }
}
