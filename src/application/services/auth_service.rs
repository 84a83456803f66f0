use crate::domain::entities::{
    AuthenticatedUser, ChangePasswordRequest, LoginRequest, LoginResponse, User,
    UserResponse,
};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::rate_limiter::AuthRateLimiter;
use crate::shared::utils::email_validator::validate_and_normalize_email;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use std::sync::Arc;

use super::SessionService;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Passwords must be 6-72 characters long.
pub fn validate_password(password: &str) -> ApiResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Hash password using Argon2id with parameters:
/// - m_cost = 19456 KiB (19 MiB)
/// - t_cost = 2 iterations
/// - p_cost = 1 thread
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify password against an Argon2id hash
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Secure random session token (32 bytes = 64 hex characters)
pub fn generate_session_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

fn locked_out(wait: std::time::Duration) -> ApiError {
    ApiError::TooManyRequests(format!(
        "Too many failed login attempts. Try again in {} seconds",
        wait.as_secs().max(1)
    ))
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_service: SessionService,
    rate_limiter: AuthRateLimiter,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_service: SessionService,
        rate_limiter: AuthRateLimiter,
    ) -> Self {
        Self {
            user_repo,
            session_service,
            rate_limiter,
        }
    }

    pub fn rate_limiter(&self) -> &AuthRateLimiter {
        &self.rate_limiter
    }

    /// Full login flow:
    /// 1. Normalize the email and check the lockout
    /// 2. Look the user up and verify the password (failures count towards the lockout)
    /// 3. Refuse inactive users
    /// 4. Record the login and open a session
    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let email = validate_and_normalize_email(&request.email)?;

        if let Err(wait) = self.rate_limiter.check(&email).await {
            metrics::counter!("oxicrm_logins_total", "outcome" => "locked").increment(1);
            return Err(locked_out(wait));
        }

        let user = match self.user_repo.get_user_by_email(&email).await? {
            Some(user) if verify_password(&request.password, &user.password_hash)? => user,
            _ => return Err(self.record_failure(&email).await),
        };

        if !user.active {
            metrics::counter!("oxicrm_logins_total", "outcome" => "inactive").increment(1);
            return Err(ApiError::Unauthorized("User is inactive".to_string()));
        }

        self.rate_limiter.reset(&email).await;

        let now = chrono::Utc::now().to_rfc3339();
        self.user_repo.update_last_login(&user.id, &now).await?;

        let session = self.session_service.open(&user.id).await?;

        metrics::counter!("oxicrm_logins_total", "outcome" => "success").increment(1);
        tracing::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: UserResponse::from(User {
                last_login_at: Some(now),
                ..user
            }),
        })
    }

    async fn record_failure(&self, email: &str) -> ApiError {
        metrics::counter!("oxicrm_logins_total", "outcome" => "failure").increment(1);
        match self.rate_limiter.record_failure(email).await {
            Ok(()) => invalid_credentials(),
            Err(wait) => {
                tracing::warn!("Login locked out for {} after repeated failures", email);
                locked_out(wait)
            }
        }
    }

    pub async fn logout(&self, auth_user: &AuthenticatedUser) -> ApiResult<()> {
        self.session_service.close(&auth_user.token).await?;
        tracing::info!("User {} logged out", auth_user.user.id);
        Ok(())
    }

    pub async fn change_password(
        &self,
        auth_user: &AuthenticatedUser,
        request: ChangePasswordRequest,
    ) -> ApiResult<()> {
        if request.current_password.is_empty() || request.new_password.is_empty() {
            return Err(ApiError::BadRequest(
                "Current password and new password are required".to_string(),
            ));
        }

        let mut user = self
            .user_repo
            .get_user_by_id(&auth_user.user.id)
            .await?
            .ok_or_else(ApiError::unauthorized)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(ApiError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(&request.new_password)?;

        user.password_hash = hash_password(&request.new_password)?;
        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.user_repo.update_user(&user).await?;

        tracing::info!("User {} changed their password", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length_rules() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(validate_password(&"a".repeat(73)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("segredo123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("segredo123", &hash).unwrap());
        assert!(!verify_password("outra", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_session_token_generation() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_session_token());
    }
}
