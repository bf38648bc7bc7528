/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, me)
/// - `tasks`: Task lifecycle endpoints
/// - `users`: User management endpoints
/// - `notifications`: Real-time notification stream (SSE)

pub mod auth;
pub mod health;
pub mod notifications;
pub mod tasks;
pub mod users;
