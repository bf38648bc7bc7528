/// Domain models for TaskTrack
///
/// This module contains the two aggregates of the system and their
/// enumerations.
///
/// # Models
///
/// - `user`: User accounts with their single role
/// - `task`: Tasks with status, assignment, and embedded comments
///
/// Users and tasks are related by reference only. Deleting a user does not
/// cascade into tasks, so `assigned_to` / `created_by` references may
/// dangle and readers must treat a missing user as absent rather than as an
/// error.

pub mod task;
pub mod user;
