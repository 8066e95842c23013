use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::model::Company;
use crate::store::Store;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CompanyQuery {
    #[schema(example = 1)]
    pub organization_id: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    #[schema(example = "Creative Groups Pvt Ltd")]
    pub name: String,

    #[schema(example = true)]
    pub pf_enabled: bool,

    #[schema(example = true)]
    pub esi_enabled: bool,

    pub organization_id: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/company",
    params(CompanyQuery),
    responses((status = 200, body = [Company])),
    tag = "Company"
)]
pub async fn list_companies(
    store: web::Data<Store>,
    query: web::Query<CompanyQuery>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    let mut companies: Vec<Company> = data
        .companies
        .iter()
        .filter(|c| {
            query
                .organization_id
                .is_none_or(|org| c.organization_id == Some(org))
        })
        .cloned()
        .collect();
    companies.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(HttpResponse::Ok().json(companies))
}

#[utoipa::path(
    get,
    path = "/api/company/{id}",
    params(("id" = u32, Path, description = "Company ID")),
    responses((status = 200, body = Company), (status = 404)),
    tag = "Company"
)]
pub async fn get_company(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    match data.company(path.into_inner()) {
        Some(company) => Ok(HttpResponse::Ok().json(company)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[utoipa::path(
    post,
    path = "/api/company",
    request_body = CreateCompanyRequest,
    responses((status = 201, body = Company)),
    tag = "Company"
)]
pub async fn create_company(
    store: web::Data<Store>,
    payload: web::Json<CreateCompanyRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let company = store
        .mutate(|data| {
            let id = data.next_id();
            let company = Company {
                id,
                name: payload.name.clone(),
                pf_enabled: payload.pf_enabled,
                esi_enabled: payload.esi_enabled,
                organization_id: payload.organization_id,
            };
            data.companies.push(company.clone());
            company
        })
        .await;
    Ok(HttpResponse::Created().json(company))
}

#[utoipa::path(
    put,
    path = "/api/company/{id}",
    request_body = Company,
    params(("id" = u32, Path, description = "Company ID")),
    responses((status = 204), (status = 400, description = "ID mismatch"), (status = 404)),
    tag = "Company"
)]
pub async fn update_company(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<Company>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    if id != payload.id {
        return Ok(HttpResponse::BadRequest().finish());
    }

    let found = store
        .mutate(|data| {
            if let Some(company) = data.company_mut(id) {
                *company = payload.clone();
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

/// Hard delete. Employees, payroll months and entries cascade away with the
/// company; organizations and users soft-delete instead.
#[utoipa::path(
    delete,
    path = "/api/company/{id}",
    params(("id" = u32, Path, description = "Company ID")),
    responses((status = 204), (status = 404)),
    tag = "Company"
)]
pub async fn delete_company(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let removed = store.mutate(|data| data.remove_company(id).is_some()).await;
    if removed {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound()
            .json(json!({ "message": format!("Company with ID {id} not found.") })))
    }
}
