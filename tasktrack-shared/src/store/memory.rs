/// Thread-safe in-memory store
///
/// Implements both storage traits over `Arc<RwLock<..>>` maps with an
/// email index. The test suites run entirely against this backend, and the
/// API server can be wired to it when no database is available.

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{Comment, NewTask, Task, TaskStatus};
use crate::models::user::{NewUser, Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory backend for users and tasks
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
    tasks: HashMap<Uuid, Task>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn newest_first<T, F: Fn(&T) -> DateTime<Utc>>(mut items: Vec<T>, created_at: F) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let mut state = self.write()?;

        if state.email_index.contains_key(&data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            name: data.name,
            role: data.role,
            created_at: now,
            updated_at: now,
        };

        state.email_index.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users: Vec<User> = self.read()?.users.values().cloned().collect();
        Ok(newest_first(users, |u| u.created_at))
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.read()?.users.len() as i64)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let mut state = self.write()?;
        Ok(state.users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.users.remove(&id) {
            Some(user) => {
                state.email_index.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        let mut state = self.write()?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: TaskStatus::Pending,
            accepted: false,
            due_date: data.due_date,
            assigned_to: data.assigned_to,
            created_by: data.created_by,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        let tasks: Vec<Task> = self.read()?.tasks.values().cloned().collect();
        Ok(newest_first(tasks, |t| t.created_at))
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|t| t.assigned_to == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(tasks, |t| t.created_at))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        accepted: bool,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        Ok(state.tasks.get_mut(&id).map(|task| {
            task.status = status;
            task.accepted = accepted;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn set_assignee(
        &self,
        id: Uuid,
        assignee: Option<Uuid>,
        status: TaskStatus,
        accepted: bool,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        Ok(state.tasks.get_mut(&id).map(|task| {
            task.assigned_to = assignee;
            task.status = status;
            task.accepted = accepted;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn append_comment(&self, id: Uuid, comment: Comment) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        Ok(state.tasks.get_mut(&id).map(|task| {
            task.comments.push(comment);
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.write()?.tasks.remove(&id).is_some())
    }

    async fn list_due_before(&self, deadline: DateTime<Utc>) -> StoreResult<Vec<Task>> {
        let tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|t| {
                t.status != TaskStatus::Completed
                    && t.due_date.map(|due| due <= deadline).unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(newest_first(tasks, |t| t.created_at))
    }
}
