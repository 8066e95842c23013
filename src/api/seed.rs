use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::model::{Organization, User, UserRole};
use crate::store::{Dataset, Store};

fn admin_exists(data: &Dataset) -> bool {
    data.users.iter().any(|u| u.role == UserRole::Admin)
}

fn push_admin(data: &mut Dataset) -> u32 {
    let id = data.next_id();
    data.users.push(User {
        id,
        username: "admin".into(),
        password: "admin123".into(),
        role: UserRole::Admin,
        organization_id: None,
        is_active: true,
        created_date: Utc::now(),
    });
    id
}

/// First-run bootstrap: one admin account with the well-known default
/// credentials. Refused once any admin exists.
#[utoipa::path(
    post,
    path = "/api/seed/create-admin",
    responses(
        (status = 200, description = "Admin created"),
        (status = 409, description = "An admin already exists")
    ),
    tag = "Seed"
)]
pub async fn create_admin(store: web::Data<Store>) -> actix_web::Result<impl Responder> {
    let res = store
        .transact(|data| {
            if admin_exists(data) {
                return Err(());
            }
            Ok(push_admin(data))
        })
        .await;

    match res {
        Ok(id) => {
            info!(user_id = id, "seeded default admin");
            Ok(HttpResponse::Ok()
                .json(json!({ "message": "Admin user created.", "username": "admin" })))
        }
        Err(()) => Ok(
            HttpResponse::Conflict().json(json!({ "message": "An admin user already exists." }))
        ),
    }
}

/// Demo dataset: the default admin plus a sample organization and one user
/// under it. Safe to call repeatedly; existing usernames are left alone.
#[utoipa::path(
    post,
    path = "/api/seed/seed-all",
    responses((status = 200, description = "Seed data ensured")),
    tag = "Seed"
)]
pub async fn seed_all(store: web::Data<Store>) -> actix_web::Result<impl Responder> {
    store
        .mutate(|data| {
            if !admin_exists(data) {
                push_admin(data);
            }
            let org_id = match data.organizations.iter().find(|o| o.username == "org1") {
                Some(org) => org.id,
                None => {
                    let id = data.next_id();
                    data.organizations.push(Organization {
                        id,
                        name: "Sample Organization".into(),
                        username: "org1".into(),
                        password: "org123".into(),
                        is_active: true,
                        created_date: Utc::now(),
                    });
                    id
                }
            };
            if !data.users.iter().any(|u| u.username == "user1") {
                let id = data.next_id();
                data.users.push(User {
                    id,
                    username: "user1".into(),
                    password: "user123".into(),
                    role: UserRole::User,
                    organization_id: Some(org_id),
                    is_active: true,
                    created_date: Utc::now(),
                });
            }
        })
        .await;

    info!("seed data ensured");
    Ok(HttpResponse::Ok().json(json!({ "message": "Seed data created." })))
}
