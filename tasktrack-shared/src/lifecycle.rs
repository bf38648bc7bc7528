/// Task lifecycle state machine
///
/// This module plans status changes without touching storage: given the
/// actor's role, the task as currently stored, and the requested target
/// status, it either returns the `(status, accepted)` pair to write or
/// rejects the request. Keeping the rules here makes every transition
/// decision testable in isolation and keeps the services free of
/// state-machine logic.
///
/// # Rules
///
/// ```text
/// pending → in-progress → completed
/// ```
///
/// - Owners and project managers may set any status in any direction.
///   Moving a task back to `pending` clears its acceptance flag; moving it
///   to `completed` sets the flag, so the invariants below always hold.
/// - The assigned employee's path is forward-only: `pending → in-progress`
///   happens through acceptance, and `in-progress → completed` requires the
///   task to have been accepted first. No reverts, no skipping.
/// - Reassignment resets the task to `pending` with `accepted = false`;
///   the new assignee must acknowledge the task themselves.
///
/// # Invariants
///
/// - `accepted == true` never coexists with `status == pending`
/// - `status == completed` implies `accepted == true`

use crate::models::task::{Task, TaskStatus};
use crate::models::user::Role;

/// The `(status, accepted)` pair a planned transition writes back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// New status
    pub status: TaskStatus,

    /// New acceptance flag
    pub accepted: bool,
}

/// Error type for rejected transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The requested edge does not exist for this actor
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Accept was called on a task that is already accepted
    #[error("Task has already been accepted")]
    AlreadyAccepted,
}

/// Plans a direct status change
///
/// The caller must already have verified through the policy module that
/// the actor may touch this task at all; this function only decides
/// whether the edge itself is legal for the actor's role.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTransition`] when an employee requests
/// a backward edge, skips acceptance, or tries to jump straight to
/// `completed`.
pub fn plan_status_change(
    role: Role,
    task: &Task,
    target: TaskStatus,
) -> Result<StatusChange, LifecycleError> {
    match role {
        // Privileged roles may correct status freely; acceptance is kept
        // consistent with the invariants as a side effect.
        Role::Owner | Role::ProjectManager => Ok(StatusChange {
            status: target,
            accepted: match target {
                TaskStatus::Pending => false,
                TaskStatus::InProgress => task.accepted,
                TaskStatus::Completed => true,
            },
        }),
        Role::Employee => {
            if !task.status.is_forward_step(target) {
                return Err(LifecycleError::InvalidTransition {
                    from: task.status,
                    to: target,
                });
            }

            match target {
                // Setting in-progress on a pending task is acceptance
                TaskStatus::InProgress => Ok(StatusChange {
                    status: TaskStatus::InProgress,
                    accepted: true,
                }),
                TaskStatus::Completed => {
                    // Completion requires having passed through acceptance
                    if !task.accepted {
                        return Err(LifecycleError::InvalidTransition {
                            from: task.status,
                            to: target,
                        });
                    }
                    Ok(StatusChange {
                        status: TaskStatus::Completed,
                        accepted: true,
                    })
                }
                // Unreachable via is_forward_step, but the match stays exhaustive
                TaskStatus::Pending => Err(LifecycleError::InvalidTransition {
                    from: task.status,
                    to: target,
                }),
            }
        }
    }
}

/// Plans an acceptance
///
/// Acceptance sets the flag and promotes a pending task to in-progress. A
/// task forced to in-progress by a manager can still be accepted afterwards
/// without changing its status.
///
/// # Errors
///
/// Returns [`LifecycleError::AlreadyAccepted`] when the flag is already
/// set, and [`LifecycleError::InvalidTransition`] for completed tasks.
pub fn plan_accept(task: &Task) -> Result<StatusChange, LifecycleError> {
    if task.accepted {
        return Err(LifecycleError::AlreadyAccepted);
    }

    match task.status {
        TaskStatus::Pending => Ok(StatusChange {
            status: TaskStatus::InProgress,
            accepted: true,
        }),
        TaskStatus::InProgress => Ok(StatusChange {
            status: TaskStatus::InProgress,
            accepted: true,
        }),
        TaskStatus::Completed => Err(LifecycleError::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::InProgress,
        }),
    }
}

/// The state written on reassignment
///
/// Changing the assignee always resets progress: the previous assignee's
/// acceptance must not carry over to someone who never acknowledged the
/// task.
pub fn reassignment_reset() -> StatusChange {
    StatusChange {
        status: TaskStatus::Pending,
        accepted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;
    use chrono::Utc;
    use uuid::Uuid;

    fn task_in(status: TaskStatus, accepted: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Fix bug".to_string(),
            description: String::new(),
            priority: TaskPriority::High,
            status,
            accepted,
            due_date: None,
            assigned_to: Some(Uuid::new_v4()),
            created_by: Uuid::new_v4(),
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_accept_promotes_pending_task() {
        let task = task_in(TaskStatus::Pending, false);
        let change = plan_accept(&task).expect("Accept should be planned");

        assert_eq!(change.status, TaskStatus::InProgress);
        assert!(change.accepted);
    }

    #[test]
    fn test_accept_twice_fails() {
        let task = task_in(TaskStatus::InProgress, true);
        assert_eq!(plan_accept(&task), Err(LifecycleError::AlreadyAccepted));
    }

    #[test]
    fn test_accept_after_forced_start_keeps_status() {
        // A manager set the task to in-progress without acceptance
        let task = task_in(TaskStatus::InProgress, false);
        let change = plan_accept(&task).expect("Accept should be planned");

        assert_eq!(change.status, TaskStatus::InProgress);
        assert!(change.accepted);
    }

    #[test]
    fn test_accept_completed_task_fails() {
        let task = task_in(TaskStatus::Completed, false);
        assert!(matches!(
            plan_accept(&task),
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_employee_completes_accepted_task() {
        let task = task_in(TaskStatus::InProgress, true);
        let change = plan_status_change(Role::Employee, &task, TaskStatus::Completed)
            .expect("Completion should be planned");

        assert_eq!(change.status, TaskStatus::Completed);
        assert!(change.accepted);
    }

    #[test]
    fn test_employee_cannot_skip_to_completed() {
        let task = task_in(TaskStatus::Pending, false);
        let result = plan_status_change(Role::Employee, &task, TaskStatus::Completed);

        assert_eq!(
            result,
            Err(LifecycleError::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Completed,
            })
        );
    }

    #[test]
    fn test_employee_cannot_complete_without_acceptance() {
        // In-progress by manager override, never accepted
        let task = task_in(TaskStatus::InProgress, false);
        let result = plan_status_change(Role::Employee, &task, TaskStatus::Completed);

        assert!(matches!(
            result,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_employee_cannot_revert() {
        let task = task_in(TaskStatus::InProgress, true);
        let result = plan_status_change(Role::Employee, &task, TaskStatus::Pending);

        assert!(matches!(
            result,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_employee_status_set_counts_as_acceptance() {
        let task = task_in(TaskStatus::Pending, false);
        let change = plan_status_change(Role::Employee, &task, TaskStatus::InProgress)
            .expect("Start should be planned");

        assert_eq!(change.status, TaskStatus::InProgress);
        assert!(change.accepted);
    }

    #[test]
    fn test_privileged_roles_move_freely() {
        for role in [Role::Owner, Role::ProjectManager] {
            let completed = task_in(TaskStatus::Completed, true);
            let change = plan_status_change(role, &completed, TaskStatus::Pending)
                .expect("Correction should be planned");

            // Returning to pending clears acceptance
            assert_eq!(change.status, TaskStatus::Pending);
            assert!(!change.accepted);

            let pending = task_in(TaskStatus::Pending, false);
            let change = plan_status_change(role, &pending, TaskStatus::Completed)
                .expect("Jump should be planned");

            // Completion always implies acceptance
            assert_eq!(change.status, TaskStatus::Completed);
            assert!(change.accepted);
        }
    }

    #[test]
    fn test_privileged_start_does_not_fake_acceptance() {
        let task = task_in(TaskStatus::Pending, false);
        let change = plan_status_change(Role::Owner, &task, TaskStatus::InProgress)
            .expect("Start should be planned");

        assert_eq!(change.status, TaskStatus::InProgress);
        assert!(!change.accepted, "Only the assignee accepts");
    }

    #[test]
    fn test_planned_changes_preserve_invariants() {
        let statuses = [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ];

        for role in [Role::Owner, Role::ProjectManager, Role::Employee] {
            for &from in &statuses {
                for accepted in [false, true] {
                    for &to in &statuses {
                        let task = task_in(from, accepted);
                        if let Ok(change) = plan_status_change(role, &task, to) {
                            let accepted_never_pending =
                                !(change.accepted && change.status == TaskStatus::Pending);
                            let completed_implies_accepted =
                                change.status != TaskStatus::Completed || change.accepted;
                            assert!(
                                accepted_never_pending && completed_implies_accepted,
                                "{role:?}: {from:?}(accepted={accepted}) -> {to:?} broke invariants"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_reassignment_resets_progress() {
        let change = reassignment_reset();
        assert_eq!(change.status, TaskStatus::Pending);
        assert!(!change.accepted);
    }
}
