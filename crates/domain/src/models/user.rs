//! User accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_phone, validate_username};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::media_url;

/// Account role. Fixed at registration; only an admin can change it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Driver,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Driver => "driver",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Human readable label shown by the mobile apps.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Driver => "Livreur",
            Role::Manager => "Gérant",
            Role::Admin => "Administrateur",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "driver" => Ok(Role::Driver),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub avatar: Option<String>,
    /// Drivers only: whether they accept new missions.
    pub is_available: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// "First Last", trimmed; empty when neither is set.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub fn to_response(&self, media_base_url: &str) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            role_display: self.role.label(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            avatar_url: media_url(media_base_url, self.avatar.as_deref()),
            is_available: self.is_available,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

/// Session row backing a refresh token.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub role_display: &'static str,
    pub phone: String,
    pub address: String,
    pub avatar_url: Option<String>,
    pub is_available: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Access and refresh tokens handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenResponse,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_registration"))]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[validate(length(max = 200))]
    pub restaurant_name: Option<String>,
    pub restaurant_address: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub restaurant_phone: Option<String>,
}

impl RegisterRequest {
    /// Restaurant name to create alongside a manager account.
    pub fn restaurant_name(&self) -> Option<&str> {
        self.restaurant_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn into_new_user(self, password_hash: String) -> (NewUser, Option<RestaurantSignup>) {
        let signup = match (self.role, self.restaurant_name()) {
            (Role::Manager, Some(name)) => Some(RestaurantSignup {
                name: name.to_string(),
                address: self.restaurant_address.clone(),
                phone: self.restaurant_phone.clone(),
            }),
            _ => None,
        };
        let user = NewUser {
            username: self.username,
            email: self.email.trim().to_lowercase(),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            phone: self.phone,
            address: self.address,
            is_available: true,
            is_active: true,
        };
        (user, signup)
    }
}

/// Values for inserting a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub is_available: bool,
    pub is_active: bool,
}

/// Restaurant requested by a manager at registration.
#[derive(Debug, Clone)]
pub struct RestaurantSignup {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    match req.role {
        Role::Admin => {
            let mut err = ValidationError::new("role");
            err.message = Some("Administrator accounts cannot be self-registered".into());
            Err(err)
        }
        Role::Manager if req.restaurant_name().is_none() => {
            let mut err = ValidationError::new("restaurant_name");
            err.message = Some("Restaurant name is required for managers".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Login accepts either the email or the username in `email`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub detail: &'static str,
}

/// Self-service profile edits. Role is not editable here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_available: Option<bool>,
}

/// Account creation from the back office.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateUserRequest {
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email.trim().to_lowercase(),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            phone: self.phone,
            address: self.address,
            is_available: self.is_available,
            is_active: self.is_active,
        }
    }
}

/// Back-office edits, including role override and account disabling.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkAvailabilityRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 ids"))]
    pub ids: Vec<Uuid>,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    fn register(role: Role, restaurant_name: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: "amina".into(),
            email: "amina@example.com".into(),
            password: "secret1".into(),
            password_confirm: "secret1".into(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            role,
            phone: "+229 97 11 22 33".into(),
            address: String::new(),
            restaurant_name: restaurant_name.map(String::from),
            restaurant_address: None,
            restaurant_phone: None,
        }
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "koffi".into(),
            email: "koffi@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            first_name: "Koffi".into(),
            last_name: "".into(),
            role: Role::Driver,
            phone: String::new(),
            address: String::new(),
            avatar: Some("avatars/k.png".into()),
            is_available: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Client, Role::Driver, Role::Manager, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert_eq!(Role::from_str("DRIVER").unwrap(), Role::Driver);
        assert!(Role::from_str("chef").is_err());
        assert_eq!(Role::default(), Role::Client);
        assert_eq!(Role::Driver.label(), "Livreur");
    }

    #[test]
    fn test_client_registration_is_valid() {
        assert!(register(Role::Client, None).validate().is_ok());
    }

    #[test]
    fn test_password_mismatch_is_reported_on_confirm_field() {
        let mut req = register(Role::Client, None);
        req.password_confirm = "different".into();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut req = register(Role::Client, None);
        req.password = "12345".into();
        req.password_confirm = "12345".into();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_manager_requires_restaurant_name() {
        assert!(register(Role::Manager, None).validate().is_err());
        assert!(register(Role::Manager, Some("   ")).validate().is_err());
        assert!(register(Role::Manager, Some("Chez Maman")).validate().is_ok());
    }

    #[test]
    fn test_admin_cannot_self_register() {
        assert!(register(Role::Admin, None).validate().is_err());
    }

    #[test]
    fn test_profile_update_rejects_bad_email() {
        let req = UpdateProfileRequest {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_hides_hash_and_renders_avatar() {
        let user = sample_user();
        let json = serde_json::to_value(user.to_response("http://media.local")).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "driver");
        assert_eq!(json["role_display"], "Livreur");
        assert_eq!(json["avatar_url"], "http://media.local/avatars/k.png");
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        assert_eq!(sample_user().full_name(), "Koffi");
        assert_eq!(full_name("", ""), "");
    }
}
