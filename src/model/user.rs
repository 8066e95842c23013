use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    Organization,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u32,

    #[schema(example = "admin")]
    pub username: String,

    #[schema(example = "admin123")]
    pub password: String,

    pub role: UserRole,

    /// Organization the user belongs to. `None` for admins.
    #[schema(example = 1, nullable = true)]
    pub organization_id: Option<u32>,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_date: DateTime<Utc>,
}
