use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::model::UserRole;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,

    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Serialize, Default, ToSchema)]
pub struct LoginResponse {
    pub success: bool,

    #[serde(rename = "userId")]
    pub user_id: Option<u32>,

    pub username: Option<String>,
    pub role: Option<String>,

    #[serde(rename = "organizationId")]
    pub organization_id: Option<u32>,

    #[serde(rename = "organizationName")]
    pub organization_name: Option<String>,

    pub message: Option<String>,
}

fn role_name(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Admin",
        UserRole::Organization => "Organization",
        UserRole::User => "User",
    }
}

/// Plaintext credential comparison, first against users then organizations.
/// Kept byte-compatible with the legacy login flow; no hashing, no session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "Auth"
)]
pub async fn login(
    store: web::Data<Store>,
    payload: web::Json<LoginRequest>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;

    if let Some(user) = data.users.iter().find(|u| {
        u.username == payload.username && u.password == payload.password && u.is_active
    }) {
        let organization_name = user
            .organization_id
            .and_then(|id| data.organization(id))
            .map(|o| o.name.clone());
        info!(username = %user.username, "user login");
        return Ok(HttpResponse::Ok().json(LoginResponse {
            success: true,
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            role: Some(role_name(user.role).to_string()),
            organization_id: user.organization_id,
            organization_name,
            ..Default::default()
        }));
    }

    if let Some(org) = data.organizations.iter().find(|o| {
        o.username == payload.username && o.password == payload.password && o.is_active
    }) {
        info!(username = %org.username, "organization login");
        return Ok(HttpResponse::Ok().json(LoginResponse {
            success: true,
            user_id: Some(org.id),
            username: Some(org.username.clone()),
            role: Some("Organization".to_string()),
            organization_id: Some(org.id),
            organization_name: Some(org.name.clone()),
            ..Default::default()
        }));
    }

    Ok(HttpResponse::Unauthorized().json(LoginResponse {
        success: false,
        message: Some("Invalid username or password.".to_string()),
        ..Default::default()
    }))
}
