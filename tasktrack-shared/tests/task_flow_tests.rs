/// Integration tests for the task lifecycle service
///
/// Full multi-actor flows over the in-memory store: assignment,
/// acceptance, completion, the permission boundaries between roles, and
/// the notifications emitted along the way.

use std::sync::Arc;
use tasktrack_shared::auth::middleware::AuthContext;
use tasktrack_shared::events::{NotificationDispatcher, TaskEventKind};
use tasktrack_shared::lifecycle::LifecycleError;
use tasktrack_shared::models::task::{TaskPriority, TaskStatus};
use tasktrack_shared::models::user::Role;
use tasktrack_shared::services::tasks::{CreateTaskInput, TaskError, TaskService};
use tasktrack_shared::store::memory::MemoryStore;
use uuid::Uuid;

struct Harness {
    tasks: TaskService,
    dispatcher: NotificationDispatcher,
    owner: AuthContext,
    manager: AuthContext,
    employee: AuthContext,
    other_employee: AuthContext,
}

fn actor(role: Role) -> AuthContext {
    AuthContext {
        user_id: Uuid::new_v4(),
        role,
    }
}

fn harness() -> Harness {
    let dispatcher = NotificationDispatcher::new();
    let tasks = TaskService::new(Arc::new(MemoryStore::new()), dispatcher.clone());

    Harness {
        tasks,
        dispatcher,
        owner: actor(Role::Owner),
        manager: actor(Role::ProjectManager),
        employee: actor(Role::Employee),
        other_employee: actor(Role::Employee),
    }
}

fn task_input(title: &str, assigned_to: Option<Uuid>) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_string(),
        description: String::new(),
        priority: TaskPriority::High,
        due_date: None,
        assigned_to,
    }
}

#[tokio::test]
async fn test_full_lifecycle_with_interfering_employee() {
    let h = harness();

    // Owner creates a task assigned to the employee
    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(!task.accepted);

    // A different employee may not accept it
    let result = h.tasks.accept(h.other_employee, task.id).await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    // The assignee accepts
    let task = h.tasks.accept(h.employee, task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.accepted);

    // The interloper still cannot move it
    let result = h
        .tasks
        .set_status(h.other_employee, task.id, TaskStatus::Completed)
        .await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    // The assignee completes it
    let task = h
        .tasks
        .set_status(h.employee, task.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.accepted);
    assert!(task.invariants_hold());
}

#[tokio::test]
async fn test_employee_cannot_skip_acceptance() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();

    // Straight to completed without acceptance
    let result = h
        .tasks
        .set_status(h.employee, task.id, TaskStatus::Completed)
        .await;
    assert!(matches!(
        result,
        Err(TaskError::Lifecycle(LifecycleError::InvalidTransition {
            from: TaskStatus::Pending,
            to: TaskStatus::Completed,
        }))
    ));
}

#[tokio::test]
async fn test_employee_cannot_revert_after_accepting() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks.accept(h.employee, task.id).await.unwrap();

    let result = h
        .tasks
        .set_status(h.employee, task.id, TaskStatus::Pending)
        .await;
    assert!(matches!(result, Err(TaskError::Lifecycle(_))));
}

#[tokio::test]
async fn test_accept_twice_is_invalid() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks.accept(h.employee, task.id).await.unwrap();

    let result = h.tasks.accept(h.employee, task.id).await;
    assert!(matches!(
        result,
        Err(TaskError::Lifecycle(LifecycleError::AlreadyAccepted))
    ));
}

#[tokio::test]
async fn test_manager_corrects_status_backwards() {
    let h = harness();

    let task = h
        .tasks
        .create(h.manager, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks.accept(h.employee, task.id).await.unwrap();
    h.tasks
        .set_status(h.employee, task.id, TaskStatus::Completed)
        .await
        .unwrap();

    // The manager reopens the task; acceptance is cleared with it
    let task = h
        .tasks
        .set_status(h.manager, task.id, TaskStatus::Pending)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(!task.accepted);
    assert!(task.invariants_hold());
}

#[tokio::test]
async fn test_employee_cannot_create_or_assign() {
    let h = harness();

    let result = h.tasks.create(h.employee, task_input("Nope", None)).await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", None))
        .await
        .unwrap();
    let result = h
        .tasks
        .assign(h.employee, task.id, Some(h.employee.user_id))
        .await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    let h = harness();

    let task = h
        .tasks
        .create(h.manager, task_input("Fix bug", None))
        .await
        .unwrap();

    let result = h.tasks.delete(h.manager, task.id).await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    let result = h.tasks.delete(h.employee, task.id).await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    h.tasks.delete(h.owner, task.id).await.unwrap();

    let result = h.tasks.delete(h.owner, task.id).await;
    assert!(matches!(result, Err(TaskError::NotFound)));
}

#[tokio::test]
async fn test_employee_probes_get_forbidden_not_notfound() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Secret", Some(h.other_employee.user_id)))
        .await
        .unwrap();

    // Existing-but-foreign and non-existent ids are indistinguishable
    let foreign = h.tasks.get(h.employee, task.id).await;
    assert!(matches!(foreign, Err(TaskError::Forbidden(_))));

    let missing = h.tasks.get(h.employee, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(TaskError::Forbidden(_))));

    // A manager probing a missing id does learn it is missing
    let missing = h.tasks.get(h.manager, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(TaskError::NotFound)));
}

#[tokio::test]
async fn test_reassignment_resets_acceptance() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks.accept(h.employee, task.id).await.unwrap();

    // Reassign the in-progress task to someone who never accepted it
    let task = h
        .tasks
        .assign(h.owner, task.id, Some(h.other_employee.user_id))
        .await
        .unwrap();

    assert_eq!(task.assigned_to, Some(h.other_employee.user_id));
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(!task.accepted);

    // The previous assignee lost access
    let result = h.tasks.get(h.employee, task.id).await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    // The new assignee goes through acceptance themselves
    let task = h.tasks.accept(h.other_employee, task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.accepted);
}

#[tokio::test]
async fn test_visibility_is_scoped_by_role() {
    let h = harness();

    h.tasks
        .create(h.owner, task_input("Mine", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks
        .create(h.owner, task_input("Theirs", Some(h.other_employee.user_id)))
        .await
        .unwrap();
    h.tasks
        .create(h.owner, task_input("Unassigned", None))
        .await
        .unwrap();

    assert_eq!(h.tasks.list_for(h.owner).await.unwrap().len(), 3);
    assert_eq!(h.tasks.list_for(h.manager).await.unwrap().len(), 3);

    let visible = h.tasks.list_for(h.employee).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Mine");
}

#[tokio::test]
async fn test_comments_follow_ownership_rules() {
    let h = harness();

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();

    // Everyone involved may comment
    h.tasks
        .add_comment(h.owner, task.id, "Please look at this")
        .await
        .unwrap();
    h.tasks
        .add_comment(h.manager, task.id, "Bumping priority")
        .await
        .unwrap();
    let task_after = h
        .tasks
        .add_comment(h.employee, task.id, "On it")
        .await
        .unwrap();
    assert_eq!(task_after.comments.len(), 3);
    assert_eq!(task_after.comments[2].text, "On it");

    // A bystander employee may not
    let result = h
        .tasks
        .add_comment(h.other_employee, task.id, "Me too")
        .await;
    assert!(matches!(result, Err(TaskError::Forbidden(_))));

    // Empty comments are rejected
    let result = h.tasks.add_comment(h.owner, task.id, "   ").await;
    assert!(matches!(result, Err(TaskError::Validation(_))));
}

#[tokio::test]
async fn test_title_is_required() {
    let h = harness();

    let result = h.tasks.create(h.owner, task_input("   ", None)).await;
    assert!(matches!(result, Err(TaskError::Validation(_))));
}

#[tokio::test]
async fn test_assignment_notifies_assignee() {
    let h = harness();

    let mut rx = h.dispatcher.subscribe(h.employee.user_id);

    h.tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();

    let event = rx.try_recv().expect("Assignee should be notified");
    assert_eq!(event.kind, TaskEventKind::Assigned);
    assert_eq!(event.recipient, h.employee.user_id);
    assert_eq!(event.payload["title"], "Fix bug");
}

#[tokio::test]
async fn test_status_change_notifies_creator_only() {
    let h = harness();

    let mut owner_rx = h.dispatcher.subscribe(h.owner.user_id);
    let mut other_rx = h.dispatcher.subscribe(h.other_employee.user_id);

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    h.tasks.accept(h.employee, task.id).await.unwrap();

    let event = owner_rx.try_recv().expect("Creator should be notified");
    assert_eq!(event.kind, TaskEventKind::StatusChanged);
    assert_eq!(event.task_id, task.id);

    assert!(
        other_rx.try_recv().is_err(),
        "Uninvolved users see no events"
    );
}

#[tokio::test]
async fn test_comment_notification_excludes_author() {
    let h = harness();

    let mut employee_rx = h.dispatcher.subscribe(h.employee.user_id);
    let mut owner_rx = h.dispatcher.subscribe(h.owner.user_id);

    let task = h
        .tasks
        .create(h.owner, task_input("Fix bug", Some(h.employee.user_id)))
        .await
        .unwrap();
    // Drain the assignment event
    let _ = employee_rx.try_recv();

    h.tasks
        .add_comment(h.employee, task.id, "Started work")
        .await
        .unwrap();

    let event = owner_rx.try_recv().expect("Creator should be notified");
    assert_eq!(event.kind, TaskEventKind::CommentAdded);

    assert!(
        employee_rx.try_recv().is_err(),
        "Authors are not notified of their own comments"
    );
}
