/// Role-based authorization policy
///
/// This module is the single decision point for "who may do what". It is a
/// pure function of the actor's role, the requested action, and (for
/// task-scoped actions) the task itself; it has no state and performs no
/// I/O.
///
/// # Permission table
///
/// | Action                    | owner | project_manager | employee        |
/// |---------------------------|-------|-----------------|-----------------|
/// | create task               | yes   | yes             | no              |
/// | assign task               | yes   | yes             | no              |
/// | delete task               | yes   | no              | no              |
/// | update task status        | yes   | yes             | own tasks only  |
/// | add comment               | yes   | yes             | own tasks only  |
/// | list all tasks            | yes   | yes             | no (own only)   |
/// | manage users              | yes   | no              | no              |
/// | view employee list        | yes   | yes             | no              |
///
/// Callers must evaluate policy **before** looking up the target, so an
/// unauthorized caller always sees `Forbidden` and never learns whether a
/// task id exists.

use crate::models::task::Task;
use crate::models::user::Role;
use uuid::Uuid;

/// Actions that can be requested against the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Create a new task
    Create,

    /// Change a task's assignee
    Assign,

    /// Delete a task entirely
    Delete,

    /// Set a task's status
    UpdateStatus,

    /// Append a comment
    Comment,

    /// List every task in the system
    ListAll,

    /// Create/delete users or change roles
    ManageUsers,

    /// View the employee list and stats
    ViewEmployees,
}

/// Checks whether a role may perform an action at all
///
/// For `UpdateStatus` and `Comment` an employee is allowed in principle but
/// only on tasks assigned to them; use [`can_touch_task`] for that second
/// check.
pub fn allows(role: Role, action: TaskAction) -> bool {
    match action {
        TaskAction::Create => match role {
            Role::Owner | Role::ProjectManager => true,
            Role::Employee => false,
        },
        TaskAction::Assign => match role {
            Role::Owner | Role::ProjectManager => true,
            Role::Employee => false,
        },
        TaskAction::Delete => match role {
            Role::Owner => true,
            Role::ProjectManager | Role::Employee => false,
        },
        TaskAction::UpdateStatus => match role {
            Role::Owner | Role::ProjectManager => true,
            // Allowed in principle, restricted to own tasks by can_touch_task
            Role::Employee => true,
        },
        TaskAction::Comment => match role {
            Role::Owner | Role::ProjectManager => true,
            Role::Employee => true,
        },
        TaskAction::ListAll => match role {
            Role::Owner | Role::ProjectManager => true,
            Role::Employee => false,
        },
        TaskAction::ManageUsers => match role {
            Role::Owner => true,
            Role::ProjectManager | Role::Employee => false,
        },
        TaskAction::ViewEmployees => match role {
            Role::Owner | Role::ProjectManager => true,
            Role::Employee => false,
        },
    }
}

/// Checks whether an actor may mutate a specific task
///
/// Owners and project managers may touch any task. An employee may only
/// touch tasks currently assigned to them.
pub fn can_touch_task(role: Role, actor_id: Uuid, task: &Task) -> bool {
    match role {
        Role::Owner | Role::ProjectManager => true,
        Role::Employee => task.is_assigned_to(actor_id),
    }
}

/// Checks whether an actor may grant a given role to another user
///
/// Owners may grant any role. Project managers may grant `employee` or
/// `project_manager` but never `owner`. Employees may grant nothing.
pub fn can_grant_role(actor: Role, target: Role) -> bool {
    match actor {
        Role::Owner => true,
        Role::ProjectManager => match target {
            Role::Employee | Role::ProjectManager => true,
            Role::Owner => false,
        },
        Role::Employee => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn task_assigned_to(user: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Fix bug".to_string(),
            description: String::new(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            accepted: false,
            due_date: None,
            assigned_to: user,
            created_by: Uuid::new_v4(),
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_assign_restricted_to_managers() {
        for action in [TaskAction::Create, TaskAction::Assign] {
            assert!(allows(Role::Owner, action));
            assert!(allows(Role::ProjectManager, action));
            assert!(!allows(Role::Employee, action));
        }
    }

    #[test]
    fn test_delete_is_owner_only() {
        assert!(allows(Role::Owner, TaskAction::Delete));
        assert!(!allows(Role::ProjectManager, TaskAction::Delete));
        assert!(!allows(Role::Employee, TaskAction::Delete));
    }

    #[test]
    fn test_manage_users_is_owner_only() {
        assert!(allows(Role::Owner, TaskAction::ManageUsers));
        assert!(!allows(Role::ProjectManager, TaskAction::ManageUsers));
        assert!(!allows(Role::Employee, TaskAction::ManageUsers));
    }

    #[test]
    fn test_list_all_and_view_employees() {
        for action in [TaskAction::ListAll, TaskAction::ViewEmployees] {
            assert!(allows(Role::Owner, action));
            assert!(allows(Role::ProjectManager, action));
            assert!(!allows(Role::Employee, action));
        }
    }

    #[test]
    fn test_everyone_may_comment_in_principle() {
        assert!(allows(Role::Owner, TaskAction::Comment));
        assert!(allows(Role::ProjectManager, TaskAction::Comment));
        assert!(allows(Role::Employee, TaskAction::Comment));
    }

    #[test]
    fn test_employee_can_only_touch_own_tasks() {
        let employee = Uuid::new_v4();

        let own = task_assigned_to(Some(employee));
        let foreign = task_assigned_to(Some(Uuid::new_v4()));
        let unassigned = task_assigned_to(None);

        assert!(can_touch_task(Role::Employee, employee, &own));
        assert!(!can_touch_task(Role::Employee, employee, &foreign));
        assert!(!can_touch_task(Role::Employee, employee, &unassigned));

        // Privileged roles touch anything
        assert!(can_touch_task(Role::Owner, employee, &foreign));
        assert!(can_touch_task(Role::ProjectManager, employee, &foreign));
    }

    #[test]
    fn test_role_granting() {
        assert!(can_grant_role(Role::Owner, Role::Owner));
        assert!(can_grant_role(Role::Owner, Role::ProjectManager));
        assert!(can_grant_role(Role::Owner, Role::Employee));

        assert!(!can_grant_role(Role::ProjectManager, Role::Owner));
        assert!(can_grant_role(Role::ProjectManager, Role::ProjectManager));
        assert!(can_grant_role(Role::ProjectManager, Role::Employee));

        assert!(!can_grant_role(Role::Employee, Role::Employee));
        assert!(!can_grant_role(Role::Employee, Role::Owner));
    }
}
