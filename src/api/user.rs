use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::model::{User, UserRole};
use crate::store::{Dataset, Store};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    #[schema(example = 1)]
    pub organization_id: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub organization_id: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub organization_id: Option<u32>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Password is not echoed back on reads.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: u32,
    pub username: String,
    pub role: UserRole,
    pub organization_id: Option<u32>,
    pub organization_name: Option<String>,
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_date: DateTime<Utc>,
}

fn project(user: &User, data: &Dataset) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
        organization_id: user.organization_id,
        organization_name: user
            .organization_id
            .and_then(|id| data.organization(id))
            .map(|o| o.name.clone()),
        is_active: user.is_active,
        created_date: user.created_date,
    }
}

/// Role and organization must pair up: Organization-role users stand alone,
/// User-role users belong somewhere.
fn pairing_error(role: UserRole, organization_id: Option<u32>) -> Option<&'static str> {
    match role {
        UserRole::Organization if organization_id.is_some() => {
            Some("Organization role users cannot be assigned to an organization.")
        }
        UserRole::User if organization_id.is_none() => {
            Some("User role requires an organization assignment.")
        }
        _ => None,
    }
}

#[utoipa::path(
    get,
    path = "/api/user",
    params(UserQuery),
    responses((status = 200, body = [UserResponse])),
    tag = "User"
)]
pub async fn list_users(
    store: web::Data<Store>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    let mut users: Vec<UserResponse> = data
        .users
        .iter()
        .filter(|u| u.is_active)
        .filter(|u| {
            query
                .organization_id
                .is_none_or(|org| u.organization_id == Some(org))
        })
        .map(|u| project(u, &data))
        .collect();
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = u32, Path, description = "User ID")),
    responses((status = 200, body = UserResponse), (status = 404)),
    tag = "User"
)]
pub async fn get_user(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    match data.user(path.into_inner()) {
        Some(user) if user.is_active => Ok(HttpResponse::Ok().json(project(user, &data))),
        _ => Ok(HttpResponse::NotFound().finish()),
    }
}

#[utoipa::path(
    post,
    path = "/api/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Role/organization mismatch"),
        (status = 409, description = "Username already exists")
    ),
    tag = "User"
)]
pub async fn create_user(
    store: web::Data<Store>,
    payload: web::Json<CreateUserRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    if let Some(msg) = pairing_error(payload.role, payload.organization_id) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let created = store
        .transact(|data| {
            if data.username_taken(&payload.username, None, None) {
                return Err(());
            }
            let id = data.next_id();
            let user = User {
                id,
                username: payload.username.clone(),
                password: payload.password.clone(),
                role: payload.role,
                organization_id: payload.organization_id,
                is_active: true,
                created_date: Utc::now(),
            };
            data.users.push(user.clone());
            Ok(project(&user, data))
        })
        .await;

    match created {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(()) => Ok(HttpResponse::Conflict()
            .json(json!({ "message": "Username already exists. Please choose a different username." }))),
    }
}

#[utoipa::path(
    put,
    path = "/api/user/{id}",
    request_body = UpdateUserRequest,
    params(("id" = u32, Path, description = "User ID")),
    responses((status = 204), (status = 400), (status = 404), (status = 409)),
    tag = "User"
)]
pub async fn update_user(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<UpdateUserRequest>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    if let Some(msg) = pairing_error(payload.role, payload.organization_id) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    enum Fail {
        NotFound,
        Conflict,
    }
    let res = store
        .transact(|data| {
            if data.user(id).is_none() {
                return Err(Fail::NotFound);
            }
            if data.username_taken(&payload.username, Some(id), None) {
                return Err(Fail::Conflict);
            }
            let user = data.user_mut(id).ok_or(Fail::NotFound)?;
            user.username = payload.username.clone();
            user.password = payload.password.clone();
            user.role = payload.role;
            user.organization_id = payload.organization_id;
            user.is_active = payload.is_active;
            Ok(())
        })
        .await;

    match res {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(Fail::NotFound) => Ok(HttpResponse::NotFound().finish()),
        Err(Fail::Conflict) => Ok(HttpResponse::Conflict()
            .json(json!({ "message": "Username already exists. Please choose a different username." }))),
    }
}

/// Soft delete, same policy as organizations.
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    params(("id" = u32, Path, description = "User ID")),
    responses((status = 204), (status = 404)),
    tag = "User"
)]
pub async fn delete_user(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let found = store
        .mutate(|data| {
            if let Some(user) = data.user_mut(id) {
                user.is_active = false;
                true
            } else {
                false
            }
        })
        .await;

    if found {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}
