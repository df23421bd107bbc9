//! Row builders for repository tests

use chrono::Utc;
use pm_core::Id;
use pm_models::{
    Designation, Industry, Methodology, NewUser, Priority, Project, ProjectStatus, Role, Task,
    TaskStatus, User,
};
use sqlx::PgPool;

use crate::organizations::OrganizationRepository;
use crate::projects::{CreateProjectDto, ProjectRepository};
use crate::repository::Repository;
use crate::tasks::{CreateTaskDto, TaskRepository};
use crate::users::UserRepository;

fn new_user(email: String, first_name: &str, designation: Designation, role: Role) -> NewUser {
    NewUser {
        username: NewUser::default_username(&email),
        email,
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        designation,
        role,
        department: None,
        phone_number: None,
    }
}

/// A new organization; returns its admin
pub async fn organization(pool: &PgPool, name: &str) -> User {
    let admin = new_user(format!("admin@{name}.test"), "Admin", Designation::Manager, Role::Admin);
    let (_, user) = OrganizationRepository::new(pool.clone())
        .create_with_admin(name, Industry::default(), &admin, "hash")
        .await
        .unwrap();
    user
}

pub async fn employee(pool: &PgPool, organization_id: Id, first_name: &str, designation: Designation) -> User {
    let email = format!("{}.{}@staff.test", first_name.to_lowercase(), Id::new_v4().simple());
    UserRepository::new(pool.clone())
        .create_with_tracker(
            &new_user(email, first_name, designation, Role::Employee),
            "hash",
            organization_id,
        )
        .await
        .unwrap()
}

pub async fn project(pool: &PgPool, owner: &User, title: &str, assigned: Vec<Id>) -> Project {
    ProjectRepository::new(pool.clone())
        .create(CreateProjectDto {
            title: title.to_string(),
            description: None,
            client_name: None,
            repository_url: None,
            status: ProjectStatus::default(),
            priority: Priority::default(),
            technology_stack: Vec::new(),
            methodology: Methodology::default(),
            requirements: None,
            project_owner: owner.id,
            assigned_employees: assigned,
            organization_id: owner.organization_id,
            start_date: Utc::now().date_naive(),
            end_date: None,
            progress: 0,
        })
        .await
        .unwrap()
}

pub async fn task(
    pool: &PgPool,
    project: &Project,
    created_by: &User,
    category: &str,
    assigned: Vec<Id>,
) -> Task {
    TaskRepository::new(pool.clone())
        .create(CreateTaskDto {
            title: format!("{category} work"),
            description: None,
            category: category.to_string(),
            status: TaskStatus::Todo,
            priority: Priority::default(),
            assigned_employees: assigned,
            assigned_team: None,
            project_id: project.id,
            organization_id: project.organization_id,
            created_by: created_by.id,
            due_date: None,
        })
        .await
        .unwrap()
}
