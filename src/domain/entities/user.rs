use crate::domain::errors::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two permission tiers of the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
    Master,
    #[default]
    Seller,
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserProfile::Master => write!(f, "master"),
            UserProfile::Seller => write!(f, "seller"),
        }
    }
}

impl std::str::FromStr for UserProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "master" => Ok(UserProfile::Master),
            "seller" | "vendedor" => Ok(UserProfile::Seller),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid profile: {}",
                s
            ))),
        }
    }
}

/// Individual capabilities checked by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewClients,
    EditClients,
    CreateContacts,
    ViewAllContacts,
    EditContacts,
    DeleteContacts,
    UploadSpreadsheets,
    ManageUsers,
    ViewGlobalDashboard,
    ExportData,
    ViewReports,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewClients => "view_clients",
            Permission::EditClients => "edit_clients",
            Permission::CreateContacts => "create_contacts",
            Permission::ViewAllContacts => "view_all_contacts",
            Permission::EditContacts => "edit_contacts",
            Permission::DeleteContacts => "delete_contacts",
            Permission::UploadSpreadsheets => "upload_spreadsheets",
            Permission::ManageUsers => "manage_users",
            Permission::ViewGlobalDashboard => "view_global_dashboard",
            Permission::ExportData => "export_data",
            Permission::ViewReports => "view_reports",
        }
    }
}

/// Permission flags derived from a profile, serialized into user responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub view_clients: bool,
    pub edit_clients: bool,
    pub create_contacts: bool,
    pub view_all_contacts: bool,
    pub edit_contacts: bool,
    pub delete_contacts: bool,
    pub upload_spreadsheets: bool,
    pub manage_users: bool,
    pub view_global_dashboard: bool,
    pub export_data: bool,
    pub view_reports: bool,
}

impl Permissions {
    pub fn for_profile(profile: UserProfile) -> Self {
        let master = profile == UserProfile::Master;
        Self {
            view_clients: true,
            edit_clients: master,
            create_contacts: true,
            view_all_contacts: master,
            // sellers may edit, but only their own contacts
            edit_contacts: true,
            delete_contacts: master,
            upload_spreadsheets: master,
            manage_users: master,
            view_global_dashboard: master,
            export_data: master,
            view_reports: master,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ViewClients => self.view_clients,
            Permission::EditClients => self.edit_clients,
            Permission::CreateContacts => self.create_contacts,
            Permission::ViewAllContacts => self.view_all_contacts,
            Permission::EditContacts => self.edit_contacts,
            Permission::DeleteContacts => self.delete_contacts,
            Permission::UploadSpreadsheets => self.upload_spreadsheets,
            Permission::ManageUsers => self.manage_users,
            Permission::ViewGlobalDashboard => self.view_global_dashboard,
            Permission::ExportData => self.export_data,
            Permission::ViewReports => self.view_reports,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub profile: UserProfile,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, profile: UserProfile) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            phone: None,
            job_title: None,
            department: None,
            branch: None,
            profile,
            active: true,
            created_at: now.clone(),
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn is_master(&self) -> bool {
        self.profile == UserProfile::Master
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::for_profile(self.profile)
    }
}

// DTOs for API requests/responses

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub profile: UserProfile,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
    pub permissions: Permissions,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let permissions = user.permissions();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            job_title: user.job_title,
            department: user.department,
            branch: user.branch,
            profile: user.profile,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
            permissions,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub profile: Option<UserProfile>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub profile: Option<UserProfile>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub active_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub master_users: i64,
    pub seller_users: i64,
    pub by_department: Vec<super::GroupCount>,
    pub by_profile: Vec<super::GroupCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_has_every_permission() {
        let perms = Permissions::for_profile(UserProfile::Master);
        for permission in [
            Permission::ViewClients,
            Permission::EditClients,
            Permission::DeleteContacts,
            Permission::ManageUsers,
            Permission::ExportData,
        ] {
            assert!(perms.allows(permission), "{}", permission.as_str());
        }
    }

    #[test]
    fn test_seller_permissions() {
        let perms = Permissions::for_profile(UserProfile::Seller);
        assert!(perms.view_clients);
        assert!(perms.create_contacts);
        assert!(perms.edit_contacts);
        assert!(!perms.edit_clients);
        assert!(!perms.view_all_contacts);
        assert!(!perms.delete_contacts);
        assert!(!perms.upload_spreadsheets);
        assert!(!perms.manage_users);
        assert!(!perms.view_global_dashboard);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("MASTER".parse::<UserProfile>().unwrap(), UserProfile::Master);
        assert_eq!("vendedor".parse::<UserProfile>().unwrap(), UserProfile::Seller);
        assert!("admin".parse::<UserProfile>().is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new(
            "Ana".to_string(),
            "ana@example.com".to_string(),
            "$argon2id$secret".to_string(),
            UserProfile::Seller,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
