use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tenant that owns companies and users. Credentials are stored in plaintext
/// for compatibility with the existing login flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Sample Organization",
        "username": "org1",
        "password": "org123",
        "is_active": true,
        "created_date": "2025-01-01T00:00:00Z"
    })
)]
pub struct Organization {
    #[schema(example = 1)]
    pub id: u32,

    #[schema(example = "Sample Organization")]
    pub name: String,

    #[schema(example = "org1")]
    pub username: String,

    #[schema(example = "org123")]
    pub password: String,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_date: DateTime<Utc>,
}
