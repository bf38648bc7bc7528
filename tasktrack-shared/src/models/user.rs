/// User model and role enumeration
///
/// This module provides the User model and the closed set of roles that
/// drive every authorization decision in TaskTrack.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('owner', 'project_manager', 'employee');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'employee',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Email matching is case-sensitive (plain TEXT equality, not CITEXT).
///
/// # Roles
///
/// - **owner**: full task and user management
/// - **project_manager**: create/assign/manage tasks, view employees
/// - **employee**: act only on own assigned tasks, post comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three roles a user can hold, exactly one at a time.
///
/// The enum is deliberately closed: every policy decision matches on it
/// exhaustively, so adding a role is a compile-time-visible change at each
/// decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control: all task operations plus user management
    Owner,

    /// Can create, assign, and manage tasks and view employees
    ProjectManager,

    /// Can act on tasks assigned to them and post comments
    Employee,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::ProjectManager => "project_manager",
            Role::Employee => "employee",
        }
    }

    /// Can create and delete users and change roles
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Can create and assign tasks
    pub fn can_manage_tasks(&self) -> bool {
        matches!(self, Role::Owner | Role::ProjectManager)
    }

    /// Can delete tasks
    pub fn can_delete_tasks(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Can view every task, not just own assignments
    pub fn can_view_all_tasks(&self) -> bool {
        matches!(self, Role::Owner | Role::ProjectManager)
    }

    /// Can view the employee list and per-employee stats
    pub fn can_view_employees(&self) -> bool {
        matches!(self, Role::Owner | Role::ProjectManager)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model representing an account
///
/// The password hash is an opaque Argon2id PHC string and is never
/// serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique with case-sensitive matching
    pub email: String,

    /// Argon2id password hash, never exposed to callers
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// The user's single role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (not the plaintext password)
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// Role to assign
    pub role: Role,
}
