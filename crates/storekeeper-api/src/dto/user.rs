//! User management DTOs

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storekeeper_db::{Gender, Role, UserRecord};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Sanitized user profile returned by the API.
///
/// Deliberately has no password field of any kind.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, example = "FEMALE")]
    pub gender: Gender,
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    pub enabled: bool,
    #[schema(value_type = Vec<String>, example = json!(["USER"]))]
    pub roles: HashSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserDto {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender,
            birth_date: user.birth_date,
            enabled: user.enabled,
            roles: user.roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Admin create-user request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[schema(value_type = String, example = "MALE")]
    pub gender: Gender,
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[schema(value_type = Vec<String>, example = json!(["USER", "ADMIN"]))]
    pub roles: HashSet<Role>,
}

/// Admin update-user request (full replace; password unchanged)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[schema(value_type = String, example = "MALE")]
    pub gender: Gender,
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    pub enabled: bool,
    #[schema(value_type = Vec<String>)]
    pub roles: HashSet<Role>,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_has_no_password_field() {
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            enabled: true,
            roles: HashSet::from([Role::User]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserDto::from(user)).unwrap();
        assert!(!json.to_lowercase().contains("password"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"firstName\""));
        assert!(json.contains("\"USER\""));
    }
}
