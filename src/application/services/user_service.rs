use crate::domain::entities::{
    AuthenticatedUser, CreateUserRequest, PageRequest, Paginated, ResetPasswordRequest,
    UpdateUserRequest, User, UserFilter, UserProfile, UserResponse, UserStats,
};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::email_validator::validate_and_normalize_email;
use std::sync::Arc;

use super::auth_service::{hash_password, validate_password};
use super::SessionService;

pub const DEFAULT_USERS_PER_PAGE: i64 = 20;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_service: SessionService,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, session_service: SessionService) -> Self {
        Self {
            user_repo,
            session_service,
        }
    }

    pub async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        self.user_repo.get_user_by_id(id).await
    }

    async fn require_user(&self, id: &str) -> ApiResult<User> {
        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    async fn ensure_email_available(&self, email: &str, except_id: Option<&str>) -> ApiResult<()> {
        match self.user_repo.get_user_by_email(email).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => {
                Err(ApiError::Conflict("Email already exists".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> ApiResult<Paginated<UserResponse>> {
        let users = self
            .user_repo
            .list_users(filter, page.limit(), page.offset())
            .await?;
        let total = self.user_repo.count_users(filter).await?;

        Ok(Paginated::new(
            users.into_iter().map(UserResponse::from).collect(),
            page,
            total,
        ))
    }

    pub async fn get_user(&self, id: &str) -> ApiResult<UserResponse> {
        Ok(self.require_user(id).await?.into())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> ApiResult<UserResponse> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        if request.email.trim().is_empty() {
            return Err(ApiError::BadRequest("Email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(ApiError::BadRequest("Password is required".to_string()));
        }

        let email = validate_and_normalize_email(&request.email)?;
        validate_password(&request.password)?;
        self.ensure_email_available(&email, None).await?;

        let mut user = User::new(
            name,
            email,
            hash_password(&request.password)?,
            request.profile.unwrap_or_default(),
        );
        user.phone = blank_to_none(request.phone);
        user.job_title = blank_to_none(request.job_title);
        user.department = blank_to_none(request.department);
        user.branch = blank_to_none(request.branch);
        user.active = request.active.unwrap_or(true);

        self.user_repo.create_user(&user).await?;
        tracing::info!("Created {} user {} ({})", user.profile, user.id, user.email);

        Ok(user.into())
    }

    pub async fn update_user(&self, id: &str, request: UpdateUserRequest) -> ApiResult<UserResponse> {
        let mut user = self.require_user(id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
            }
            user.name = name;
        }

        if let Some(email) = request.email {
            let email = validate_and_normalize_email(&email)?;
            if email != user.email {
                self.ensure_email_available(&email, Some(&user.id)).await?;
                user.email = email;
            }
        }

        if let Some(password) = request.password.filter(|p| !p.is_empty()) {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }

        if request.phone.is_some() {
            user.phone = blank_to_none(request.phone);
        }
        if request.job_title.is_some() {
            user.job_title = blank_to_none(request.job_title);
        }
        if request.department.is_some() {
            user.department = blank_to_none(request.department);
        }
        if request.branch.is_some() {
            user.branch = blank_to_none(request.branch);
        }
        if let Some(profile) = request.profile {
            user.profile = profile;
        }
        let deactivated = matches!(request.active, Some(false)) && user.active;
        if let Some(active) = request.active {
            user.active = active;
        }

        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.user_repo.update_user(&user).await?;

        if deactivated {
            self.session_service.revoke_user(&user.id).await?;
        }

        tracing::info!("Updated user {}", user.id);
        Ok(user.into())
    }

    async fn set_active(&self, actor: &AuthenticatedUser, id: &str, active: bool) -> ApiResult<User> {
        let mut user = self.require_user(id).await?;

        if !active && actor.user.id == user.id {
            return Err(ApiError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        user.active = active;
        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.user_repo.update_user(&user).await?;

        if !active {
            let revoked = self.session_service.revoke_user(&user.id).await?;
            tracing::info!("Deactivated user {} ({} sessions revoked)", user.id, revoked);
        } else {
            tracing::info!("Activated user {}", user.id);
        }

        Ok(user)
    }

    /// Users are never removed, only deactivated.
    pub async fn deactivate_user(&self, actor: &AuthenticatedUser, id: &str) -> ApiResult<UserResponse> {
        Ok(self.set_active(actor, id, false).await?.into())
    }

    pub async fn toggle_user_status(
        &self,
        actor: &AuthenticatedUser,
        id: &str,
    ) -> ApiResult<UserResponse> {
        let user = self.require_user(id).await?;
        Ok(self.set_active(actor, id, !user.active).await?.into())
    }

    pub async fn reset_password(&self, id: &str, request: ResetPasswordRequest) -> ApiResult<()> {
        if request.new_password.is_empty() {
            return Err(ApiError::BadRequest("New password is required".to_string()));
        }
        validate_password(&request.new_password)?;

        let mut user = self.require_user(id).await?;
        user.password_hash = hash_password(&request.new_password)?;
        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.user_repo.update_user(&user).await?;

        tracing::info!("Password reset for user {}", user.id);
        Ok(())
    }

    pub async fn user_stats(&self) -> ApiResult<UserStats> {
        self.user_repo.user_stats().await
    }

    /// Creates the initial master user unless a user with `email` already exists.
    /// Returns whether a user was created.
    pub async fn ensure_master_user(&self, email: &str, password: &str) -> ApiResult<bool> {
        let email = validate_and_normalize_email(email)?;
        if self.user_repo.get_user_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        validate_password(password)?;
        let user = User::new(
            "Administrator".to_string(),
            email,
            hash_password(password)?,
            UserProfile::Master,
        );
        self.user_repo.create_user(&user).await?;
        tracing::info!("Created initial master user {}", user.email);

        Ok(true)
    }
}
