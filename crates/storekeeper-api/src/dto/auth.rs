//! Authentication DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use storekeeper_db::Gender;
use utoipa::ToSchema;
use validator::Validate;

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Account password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Closed set: MALE, FEMALE, OTHER
    #[schema(value_type = String, example = "FEMALE")]
    pub gender: Gender,
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}
