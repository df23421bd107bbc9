//! Data visibility per designation
//!
//! Managers see everything in their organization. Other staff see the
//! work they own or are assigned to, widened by the task categories that
//! belong to their discipline.

use pm_core::Id;
use pm_models::{Designation, Project, Task};

use crate::permissions::CurrentUser;

/// Task categories a designation may see regardless of assignment
pub fn task_categories(designation: Designation) -> &'static [&'static str] {
    match designation {
        Designation::BusinessAnalyst => &["Requirement", "Documentation", "BA"],
        Designation::BusinessDevelopment => &["Client", "Deal", "Market", "BD"],
        Designation::DevOps => &["Deployment", "Infrastructure", "DevOps", "CI/CD"],
        Designation::Tester => &["Bug", "QA", "Testing", "Bugs"],
        Designation::Manager | Designation::TeamLead | Designation::Developer => &[],
    }
}

/// Which projects of the organization a user may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectVisibility {
    All,
    /// Projects owned by or assigned to the user
    Involved(Id),
}

impl ProjectVisibility {
    pub fn for_user(user: &CurrentUser) -> Self {
        match user.designation {
            Designation::Manager | Designation::BusinessDevelopment => ProjectVisibility::All,
            _ => ProjectVisibility::Involved(user.id),
        }
    }

    /// Member restriction to apply, `None` for unrestricted
    pub fn member(&self) -> Option<Id> {
        match self {
            ProjectVisibility::All => None,
            ProjectVisibility::Involved(id) => Some(*id),
        }
    }

    pub fn admits(&self, project: &Project) -> bool {
        match self {
            ProjectVisibility::All => true,
            ProjectVisibility::Involved(id) => project.involves(*id),
        }
    }
}

/// Which tasks of the organization a user may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskVisibility {
    All,
    /// Assigned to or created by the user, or in one of `categories`
    Scoped {
        user_id: Id,
        categories: &'static [&'static str],
    },
}

impl TaskVisibility {
    pub fn for_user(user: &CurrentUser) -> Self {
        if user.is_manager() {
            TaskVisibility::All
        } else {
            TaskVisibility::Scoped {
                user_id: user.id,
                categories: task_categories(user.designation),
            }
        }
    }

    pub fn member(&self) -> Option<Id> {
        match self {
            TaskVisibility::All => None,
            TaskVisibility::Scoped { user_id, .. } => Some(*user_id),
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TaskVisibility::All => &[],
            TaskVisibility::Scoped { categories, .. } => *categories,
        }
    }

    pub fn admits(&self, task: &Task) -> bool {
        match self {
            TaskVisibility::All => true,
            TaskVisibility::Scoped { user_id, categories } => {
                task.is_assigned(*user_id)
                    || task.created_by == *user_id
                    || categories.contains(&task.category.as_str())
            }
        }
    }
}
