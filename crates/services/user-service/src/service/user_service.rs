//! User service - registration, lookup and admin bootstrap.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Password, User, UserRole, MIN_NAME_LENGTH};

use crate::repository::UserRepository;

/// What `create_admin` did to reach an ADMIN account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    Promoted,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new USER account
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Promote an existing account to ADMIN, or create a new ADMIN account
    async fn create_admin(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<(User, AdminBootstrap)>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

fn check_account_fields(name: &str, email: &str) -> AppResult<()> {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Name must be at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(())
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        check_account_fields(&name, &email)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .repo
            .create(email, password_hash, name, UserRole::User)
            .await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn create_admin(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<(User, AdminBootstrap)> {
        check_account_fields(&name, &email)?;

        if let Some(existing) = self.repo.find_by_email(&email).await? {
            if existing.is_admin() {
                return Ok((existing, AdminBootstrap::Promoted));
            }
            let user = self.repo.set_role(existing.id, UserRole::Admin).await?;
            tracing::info!("Promoted user {} to ADMIN", user.id);
            return Ok((user, AdminBootstrap::Promoted));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .repo
            .create(email, password_hash, name, UserRole::Admin)
            .await?;

        tracing::info!("Created ADMIN user {}", user.id);
        Ok((user, AdminBootstrap::Created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use mockall::predicate::*;

    fn stored(email: &str, role: UserRole) -> User {
        let mut user = User::new(
            Uuid::new_v4(),
            email.to_string(),
            "hash".to_string(),
            "Ana".to_string(),
        );
        user.role = role;
        user
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_assigns_user_role() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email.eq_ignore_ascii_case("ana@example.com"))
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|email, hash, name, role| {
                email == "ana@example.com"
                    && hash.starts_with("$argon2")
                    && name == "Ana"
                    && *role == UserRole::User
            })
            .times(1)
            .returning(|email, hash, name, role| {
                let mut user = User::new(Uuid::new_v4(), email, hash, name);
                user.role = role;
                Ok(user)
            });

        let service = UserManager::new(Arc::new(repo));
        let user = service
            .register("ana@example.com".into(), "password123".into(), "Ana".into())
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::User);
        assert!(Password::from_hash(user.password_hash).verify("password123"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored(email, UserRole::User))));
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .register("ana@example.com".into(), "password123".into(), "Ana".into())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_short_password_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .register("ana@example.com".into(), "short".into(), "Ana".into())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_user_missing_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo));
        assert!(matches!(
            service.get_user(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_admin_promotes_existing_user() {
        let existing = stored("ana@example.com", UserRole::User);
        let id = existing.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_set_role()
            .with(eq(id), eq(UserRole::Admin))
            .times(1)
            .returning(|_, role| Ok(stored("ana@example.com", role)));
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let (user, outcome) = service
            .create_admin("Ana".into(), "ana@example.com".into(), "ignored-pass".into())
            .await
            .unwrap();

        assert_eq!(outcome, AdminBootstrap::Promoted);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_create_admin_creates_new_account() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|_, _, _, role| *role == UserRole::Admin)
            .times(1)
            .returning(|email, hash, name, role| {
                let mut user = User::new(Uuid::new_v4(), email, hash, name);
                user.role = role;
                Ok(user)
            });

        let service = UserManager::new(Arc::new(repo));
        let (user, outcome) = service
            .create_admin("Root".into(), "root@example.com".into(), "rootpass1".into())
            .await
            .unwrap();

        assert_eq!(outcome, AdminBootstrap::Created);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_create_admin_validates_input() {
        let repo = MockUserRepository::new();
        let service = UserManager::new(Arc::new(repo));

        let bad_email = service
            .create_admin("Root".into(), "root.example.com".into(), "rootpass1".into())
            .await;
        assert!(matches!(bad_email, Err(AppError::Validation(_))));

        let bad_name = service
            .create_admin("R".into(), "root@example.com".into(), "rootpass1".into())
            .await;
        assert!(matches!(bad_name, Err(AppError::Validation(_))));
    }
}
