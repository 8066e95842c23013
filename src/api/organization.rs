use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::model::Organization;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    #[schema(example = "Sample Organization")]
    pub name: String,

    #[schema(example = "org1")]
    pub username: String,

    #[schema(example = "org123")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: String,
    pub username: String,
    pub password: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[utoipa::path(
    get,
    path = "/api/organization",
    responses((status = 200, body = [Organization])),
    tag = "Organization"
)]
pub async fn list_organizations(store: web::Data<Store>) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    let mut orgs: Vec<Organization> = data
        .organizations
        .iter()
        .filter(|o| o.is_active)
        .cloned()
        .collect();
    orgs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(HttpResponse::Ok().json(orgs))
}

#[utoipa::path(
    get,
    path = "/api/organization/{id}",
    params(("id" = u32, Path, description = "Organization ID")),
    responses((status = 200, body = Organization), (status = 404)),
    tag = "Organization"
)]
pub async fn get_organization(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    match data.organization(path.into_inner()) {
        Some(org) if org.is_active => Ok(HttpResponse::Ok().json(org)),
        _ => Ok(HttpResponse::NotFound().finish()),
    }
}

#[utoipa::path(
    post,
    path = "/api/organization",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, body = Organization),
        (status = 409, description = "Username already exists")
    ),
    tag = "Organization"
)]
pub async fn create_organization(
    store: web::Data<Store>,
    payload: web::Json<CreateOrganizationRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let created = store
        .transact(|data| {
            if data.username_taken(&payload.username, None, None) {
                return Err(());
            }
            let id = data.next_id();
            let org = Organization {
                id,
                name: payload.name.clone(),
                username: payload.username.clone(),
                password: payload.password.clone(),
                is_active: true,
                created_date: Utc::now(),
            };
            data.organizations.push(org.clone());
            Ok(org)
        })
        .await;

    match created {
        Ok(org) => Ok(HttpResponse::Created().json(org)),
        Err(()) => Ok(HttpResponse::Conflict()
            .json(json!({ "message": "Username already exists. Please choose a different username." }))),
    }
}

#[utoipa::path(
    put,
    path = "/api/organization/{id}",
    request_body = UpdateOrganizationRequest,
    params(("id" = u32, Path, description = "Organization ID")),
    responses((status = 204), (status = 404), (status = 409)),
    tag = "Organization"
)]
pub async fn update_organization(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<UpdateOrganizationRequest>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    enum Fail {
        NotFound,
        Conflict,
    }
    let res = store
        .transact(|data| {
            if data.organization(id).is_none() {
                return Err(Fail::NotFound);
            }
            if data.username_taken(&payload.username, None, Some(id)) {
                return Err(Fail::Conflict);
            }
            let org = data.organization_mut(id).ok_or(Fail::NotFound)?;
            org.name = payload.name.clone();
            org.username = payload.username.clone();
            org.password = payload.password.clone();
            org.is_active = payload.is_active;
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

/// Organizations are soft-deleted: the active flag flips, the row stays.
#[utoipa::path(
    delete,
    path = "/api/organization/{id}",
    params(("id" = u32, Path, description = "Organization ID")),
    responses((status = 204), (status = 404)),
    tag = "Organization"
)]
pub async fn delete_organization(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let found = store
        .mutate(|data| {
            if let Some(org) = data.organization_mut(id) {
                org.is_active = false;
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
