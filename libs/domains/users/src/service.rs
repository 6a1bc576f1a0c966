use listing::{
    Condition, Filter, ListQuery, Page, SharedAccessor, Window, exists_other, list,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{ChangePassword, CreateUser, USER_FIELDS, UpdateUser, User, UserResponse};
use crate::password::{hash_password, verify_password};

/// Service layer for user accounts
#[derive(Clone)]
pub struct UserService {
    users: SharedAccessor<User>,
}

impl UserService {
    pub fn new(users: SharedAccessor<User>) -> Self {
        Self { users }
    }

    /// The underlying accessor, used by sales to check that a buyer exists.
    pub fn accessor(&self) -> SharedAccessor<User> {
        self.users.clone()
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListQuery) -> UserResult<Page<UserResponse>> {
        let page = list::<User, UserResponse, _>(self.users.as_ref(), &USER_FIELDS, query).await?;
        Ok(page)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> UserResult<UserResponse> {
        self.find(id).await.map(UserResponse::from)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUser) -> UserResult<UserResponse> {
        input.validate()?;
        let email = input.email.to_lowercase();
        self.ensure_email_free(&email, None).await?;

        let password_hash = hash_password(&input.password)?;
        let user = User::new(input.name, email, password_hash);
        self.users.insert(user.clone()).await?;
        tracing::info!(user_id = %user.id, "User created");

        Ok(user.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<UserResponse> {
        input.validate()?;
        let mut user = self.find(id).await?;
        let email = input.email.to_lowercase();
        self.ensure_email_free(&email, Some(id)).await?;

        user.apply_update(input.name, email);
        self.replace(user).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> UserResult<()> {
        if !self.users.delete_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn change_password(&self, id: Uuid, input: ChangePassword) -> UserResult<()> {
        input.validate()?;
        let mut user = self.find(id).await?;

        if !verify_password(&input.password_old, &user.password_hash)? {
            return Err(UserError::WrongPassword);
        }

        user.set_password_hash(hash_password(&input.password_new)?);
        self.replace(user).await?;
        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    /// The user owning `email` when `password` matches, `None` otherwise.
    /// Unknown emails and wrong passwords are indistinguishable to callers.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<Option<User>> {
        let Some(user) = self.find_by_email(&email.to_lowercase()).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let by_email = Filter::from(Condition::equals("email", email));
        let window = Window {
            limit: 1,
            offset: 0,
        };
        let found = self.users.find(&by_email, None, window).await?;
        Ok(found.into_iter().next())
    }

    async fn replace(&self, user: User) -> UserResult<UserResponse> {
        let id = user.id;
        if !self.users.update_by_id(id, user.clone()).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(user.into())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> UserResult<()> {
        let by_email = Filter::from(Condition::equals("email", email));
        if exists_other::<User, _>(self.users.as_ref(), &by_email, except).await? {
            return Err(UserError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing::InMemoryAccessor;
    use std::sync::Arc;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryAccessor::<User>::new()))
    }

    fn create(email: &str) -> CreateUser {
        CreateUser {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "analytical".to_string(),
            password_confirm: "analytical".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_lowercases_email_and_hides_hash() {
        let service = service();

        let user = service.create(create("Ada@Example.com")).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        let stored = service.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_email_ignores_case() {
        let service = service();
        service.create(create("ada@example.com")).await.unwrap();

        let err = service.create(create("ADA@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(email) if email == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_email() {
        let service = service();
        let user = service.create(create("ada@example.com")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UpdateUser {
                    name: "Countess Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Countess Lovelace");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let service = service();
        service.create(create("ada@example.com")).await.unwrap();
        let other = service.create(create("charles@example.com")).await.unwrap();

        let err = service
            .update(
                other.id,
                UpdateUser {
                    name: "Charles".to_string(),
                    email: "ada@example.com".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let service = service();
        let user = service.create(create("ada@example.com")).await.unwrap();

        let found = service
            .verify_credentials("ADA@example.com", "analytical")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(service
            .verify_credentials("ada@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .verify_credentials("nobody@example.com", "analytical")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = service();
        let user = service.create(create("ada@example.com")).await.unwrap();

        let wrong_old = ChangePassword {
            password_old: "not-it".to_string(),
            password_new: "engine-2".to_string(),
            password_confirm: "engine-2".to_string(),
        };
        assert!(matches!(
            service.change_password(user.id, wrong_old).await,
            Err(UserError::WrongPassword)
        ));

        let change = ChangePassword {
            password_old: "analytical".to_string(),
            password_new: "engine-2".to_string(),
            password_confirm: "engine-2".to_string(),
        };
        service.change_password(user.id, change).await.unwrap();

        assert!(service
            .verify_credentials("ada@example.com", "engine-2")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_change_password_confirm_mismatch_is_validation() {
        let service = service();
        let user = service.create(create("ada@example.com")).await.unwrap();

        let change = ChangePassword {
            password_old: "analytical".to_string(),
            password_new: "engine-2".to_string(),
            password_confirm: "engine-3".to_string(),
        };

        assert!(matches!(
            service.change_password(user.id, change).await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_search_on_password_hash_is_ignored() {
        let service = service();
        service.create(create("ada@example.com")).await.unwrap();
        service.create(create("charles@example.com")).await.unwrap();
        let query = ListQuery {
            search: Some("password_hash:argon2".to_string()),
            ..Default::default()
        };

        let page = service.list(&query).await.unwrap();

        assert_eq!(page.count, 2);
    }
}
