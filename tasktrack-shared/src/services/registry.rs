/// Identity and role registry
///
/// Holds user records and resolves "who may act". Registration applies the
/// bootstrap rule; every other mutation is gated by the policy module.
///
/// # Bootstrap
///
/// The first owner comes into existence in one of two ways: registering
/// with the configured bootstrap email always yields `owner`, and the
/// first account ever registered in an empty registry yields `owner`
/// regardless of email. Authentication never changes a role: the original
/// design re-granted `owner` to the bootstrap email on every login, which
/// amounts to a standing backdoor, so role changes after registration go
/// exclusively through [`RegistryService::change_role`].

use crate::auth::password::{
    generate_temp_password, hash_password, validate_password_strength, verify_password,
    PasswordError,
};
use crate::auth::policy::{self, TaskAction};
use crate::models::user::{NewUser, Role, User};
use crate::store::{StoreError, UserStore};
use std::sync::Arc;
use uuid::Uuid;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Email already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password rejected by the strength policy
    #[error("Password rejected: {0}")]
    WeakCredential(String),

    /// Actor's role does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Target user does not exist
    #[error("User not found")]
    NotFound,

    /// Credential hashing/verification failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(String),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => RegistryError::DuplicateEmail,
            StoreError::Backend(msg) => RegistryError::Store(msg),
        }
    }
}

/// User registry service
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn UserStore>,
    bootstrap_email: String,
}

impl RegistryService {
    /// Creates a registry over a user store
    ///
    /// `bootstrap_email` is the distinguished address that always receives
    /// the owner role at registration.
    pub fn new(store: Arc<dyn UserStore>, bootstrap_email: impl Into<String>) -> Self {
        Self {
            store,
            bootstrap_email: bootstrap_email.into(),
        }
    }

    /// Registers a new account
    ///
    /// Role assignment: `owner` when the email is the bootstrap address or
    /// the registry is empty, otherwise `employee`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::WeakCredential`] when the password fails policy
    /// - [`RegistryError::DuplicateEmail`] when the email is taken
    pub async fn register(&self, email: &str, password: &str, name: &str) -> RegistryResult<User> {
        validate_password_strength(password).map_err(RegistryError::WeakCredential)?;

        if self.store.find_by_email(email).await?.is_some() {
            return Err(RegistryError::DuplicateEmail);
        }

        let role = if email == self.bootstrap_email {
            Role::Owner
        } else if self.store.count().await? == 0 {
            Role::Owner
        } else {
            Role::Employee
        };

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                name: name.to_string(),
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Authenticates an account by email and password
    ///
    /// Pure lookup: no role is ever mutated on login.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidCredentials`] for an unknown email
    /// or a hash mismatch; the two cases are indistinguishable to callers.
    pub async fn authenticate(&self, email: &str, password: &str) -> RegistryResult<User> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(RegistryError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)?;
        if !valid {
            return Err(RegistryError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Looks up a user by ID
    pub async fn get(&self, id: Uuid) -> RegistryResult<Option<User>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Changes a user's role
    ///
    /// Owners may grant any role; project managers may grant
    /// `employee`/`project_manager` but never `owner`; employees may grant
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Forbidden`] when the grant is not permitted
    /// - [`RegistryError::NotFound`] when the target does not exist
    pub async fn change_role(
        &self,
        actor_role: Role,
        target_id: Uuid,
        new_role: Role,
    ) -> RegistryResult<User> {
        if !policy::can_grant_role(actor_role, new_role) {
            return Err(RegistryError::Forbidden(format!(
                "{} may not grant role {}",
                actor_role, new_role
            )));
        }

        let user = self
            .store
            .update_role(target_id, new_role)
            .await?
            .ok_or(RegistryError::NotFound)?;

        tracing::info!(user_id = %user.id, role = %user.role, "Changed role");
        Ok(user)
    }

    /// Creates an account on behalf of a new employee
    ///
    /// Owner-only. A random temporary password is generated and returned
    /// alongside the user for out-of-band delivery; only its hash is
    /// stored.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Forbidden`] for non-owner actors, or when the
    ///   requested role is `owner`
    /// - [`RegistryError::DuplicateEmail`] when the email is taken
    pub async fn create_employee(
        &self,
        actor_role: Role,
        email: &str,
        name: &str,
        role: Role,
    ) -> RegistryResult<(User, String)> {
        if !policy::allows(actor_role, TaskAction::ManageUsers) {
            return Err(RegistryError::Forbidden(
                "Only owners may create users".to_string(),
            ));
        }

        // Owner accounts come from the bootstrap rule or change_role
        if role == Role::Owner {
            return Err(RegistryError::Forbidden(
                "Owner accounts cannot be provisioned this way".to_string(),
            ));
        }

        if self.store.find_by_email(email).await?.is_some() {
            return Err(RegistryError::DuplicateEmail);
        }

        let temp_password = generate_temp_password();
        let password_hash = hash_password(&temp_password)?;

        let user = self
            .store
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                name: name.to_string(),
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Provisioned user");
        Ok((user, temp_password))
    }

    /// Deletes a user
    ///
    /// Owner-only. Tasks referencing the user are left untouched; their
    /// dangling references are tolerated by readers.
    pub async fn delete_user(&self, actor_role: Role, id: Uuid) -> RegistryResult<()> {
        if !policy::allows(actor_role, TaskAction::ManageUsers) {
            return Err(RegistryError::Forbidden(
                "Only owners may delete users".to_string(),
            ));
        }

        let deleted = self.store.delete(id).await?;
        if !deleted {
            return Err(RegistryError::NotFound);
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Lists all users
    ///
    /// Owners and project managers only ("view employee list").
    pub async fn list_users(&self, actor_role: Role) -> RegistryResult<Vec<User>> {
        if !policy::allows(actor_role, TaskAction::ViewEmployees) {
            return Err(RegistryError::Forbidden(
                "Only owners and project managers may list users".to_string(),
            ));
        }

        Ok(self.store.list().await?)
    }
}
