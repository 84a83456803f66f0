use super::{Permission, User, UserResponse};
use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
    pub last_accessed_at: String,
}

impl Session {
    pub fn new(user_id: String, token: String, duration_hours: i64) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let expires_at = now + time::Duration::hours(duration_hours);
        let now = format_rfc3339(now);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            token,
            expires_at: format_rfc3339(expires_at),
            created_at: now.clone(),
            last_accessed_at: now,
        }
    }

    /// Unparsable expiry timestamps count as expired.
    pub fn is_expired(&self) -> bool {
        match time::OffsetDateTime::parse(&self.expires_at, &Rfc3339) {
            Ok(expires_at) => expires_at < time::OffsetDateTime::now_utc(),
            Err(_) => true,
        }
    }
}

fn format_rfc3339(at: time::OffsetDateTime) -> String {
    // Rfc3339 formatting only fails for years outside 0..=9999
    at.format(&Rfc3339).unwrap_or_default()
}

/// The caller of a protected route, resolved from its bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.user.permissions().allows(permission)
    }

    pub fn require(&self, permission: Permission) -> DomainResult<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "Requires '{}' permission",
                permission.as_str()
            )))
        }
    }

    /// Seller name the caller is restricted to, `None` when they see every contact.
    pub fn contact_owner(&self) -> Option<String> {
        if self.has_permission(Permission::ViewAllContacts) {
            None
        } else {
            Some(self.user.name.clone())
        }
    }

    /// Whether the caller may modify a contact logged under `seller`.
    pub fn owns_contact(&self, seller: &str) -> bool {
        self.contact_owner().map_or(true, |owner| owner == seller)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserProfile;

    #[test]
    fn test_new_session_is_not_expired() {
        let session = Session::new("user-1".to_string(), "token".to_string(), 1);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_negative_duration_is_expired() {
        let session = Session::new("user-1".to_string(), "token".to_string(), -1);
        assert!(session.is_expired());
    }

    fn caller(profile: UserProfile) -> AuthenticatedUser {
        let user = User::new(
            "Joao".to_string(),
            "joao@example.com".to_string(),
            "hash".to_string(),
            profile,
        );
        let session = Session::new(user.id.clone(), "token".to_string(), 1);
        AuthenticatedUser {
            user,
            session,
            token: "token".to_string(),
        }
    }

    #[test]
    fn test_seller_is_scoped_to_own_contacts() {
        let seller = caller(UserProfile::Seller);
        assert_eq!(seller.contact_owner(), Some("Joao".to_string()));
        assert!(seller.owns_contact("Joao"));
        assert!(!seller.owns_contact("Maria"));
        assert!(seller.require(Permission::ManageUsers).is_err());
        assert!(seller.require(Permission::CreateContacts).is_ok());
    }

    #[test]
    fn test_master_sees_everything() {
        let master = caller(UserProfile::Master);
        assert_eq!(master.contact_owner(), None);
        assert!(master.owns_contact("Maria"));
        assert!(master.require(Permission::ManageUsers).is_ok());
    }

    #[test]
    fn test_garbage_expiry_is_expired() {
        let mut session = Session::new("user-1".to_string(), "token".to_string(), 1);
        session.expires_at = "tomorrow".to_string();
        assert!(session.is_expired());
    }
}
