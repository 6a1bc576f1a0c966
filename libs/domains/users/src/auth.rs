//! Email/password login guarded by the [`LoginThrottle`]

use axum_helpers::JwtAuth;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse};
use crate::service::UserService;
use crate::throttle::LoginThrottle;

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    throttle: LoginThrottle,
    jwt: JwtAuth,
}

impl AuthService {
    pub fn new(users: UserService, throttle: LoginThrottle, jwt: JwtAuth) -> Self {
        Self {
            users,
            throttle,
            jwt,
        }
    }

    /// A locked-out identity is refused before its password is checked.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoginResponse> {
        input.validate()?;

        if !self.throttle.check_allowed(&input.email).await {
            return Err(UserError::RateLimited {
                minutes: self.throttle.config().lockout_minutes,
            });
        }

        let Some(user) = self
            .users
            .verify_credentials(&input.email, &input.password)
            .await?
        else {
            self.throttle.record_failure(&input.email).await;
            return Err(UserError::InvalidCredentials);
        };

        self.throttle.record_success(&input.email).await;

        let token = self
            .jwt
            .create_access_token(user.id, &user.email, &user.name)
            .map_err(|e| UserError::Token(e.to_string()))?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            email: user.email,
            name: user.name,
            user_id: user.id,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUser, User};
    use crate::throttle::ThrottleConfig;
    use axum_helpers::JwtConfig;
    use listing::InMemoryAccessor;
    use std::sync::Arc;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    async fn auth() -> AuthService {
        let users = UserService::new(Arc::new(InMemoryAccessor::<User>::new()));
        users
            .create(CreateUser {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password: "analytical".to_string(),
                password_confirm: "analytical".to_string(),
            })
            .await
            .unwrap();

        let jwt = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        AuthService::new(users, LoginThrottle::in_memory(ThrottleConfig::default()), jwt)
    }

    fn login(password: &str) -> LoginRequest {
        LoginRequest {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_returns_verifiable_token() {
        let auth = auth().await;

        let response = auth.login(login("analytical")).await.unwrap();

        assert_eq!(response.email, "ada@example.com");
        assert_eq!(response.name, "Ada Lovelace");
        let claims = auth.jwt.verify_token(&response.token).unwrap();
        assert_eq!(claims.user_id(), Some(response.user_id));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let auth = auth().await;

        let err = auth.login(login("nope")).await.unwrap_err();

        assert!(matches!(err, UserError::InvalidCredentials));
        assert_eq!(auth.throttle.failure_count("ada@example.com").await, 1);
    }

    #[tokio::test]
    async fn test_sixth_attempt_is_rate_limited_even_with_right_password() {
        let auth = auth().await;
        for _ in 0..5 {
            assert!(matches!(
                auth.login(login("nope")).await,
                Err(UserError::InvalidCredentials)
            ));
        }

        let err = auth.login(login("analytical")).await.unwrap_err();

        assert!(matches!(err, UserError::RateLimited { minutes: 30 }));
    }

    #[tokio::test]
    async fn test_success_resets_failures() {
        let auth = auth().await;
        for _ in 0..3 {
            auth.login(login("nope")).await.unwrap_err();
        }

        auth.login(login("analytical")).await.unwrap();

        assert_eq!(auth.throttle.failure_count("ada@example.com").await, 0);
    }
}
