use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::model::{PayrollMonth, payroll_month::DEFAULT_TOTAL_DAYS};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayrollMonthRequest {
    #[schema(example = 1)]
    pub company_id: u32,

    #[schema(example = "August 2025")]
    pub month: String,

    /// NCP baseline; defaults to 30 when the client leaves it out.
    #[schema(example = 30)]
    pub total_days: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/payrollmonth",
    responses((status = 200, body = [PayrollMonth])),
    tag = "PayrollMonth"
)]
pub async fn list_payroll_months(store: web::Data<Store>) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    let mut months: Vec<PayrollMonth> = data.payroll_months.iter().cloned().collect();
    months.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(HttpResponse::Ok().json(months))
}

/// Months of one company, newest first.
#[utoipa::path(
    get,
    path = "/api/payrollmonth/company/{company_id}",
    params(("company_id" = u32, Path, description = "Company ID")),
    responses((status = 200, body = [PayrollMonth])),
    tag = "PayrollMonth"
)]
pub async fn list_company_payroll_months(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();
    let data = store.read().await;
    let mut months: Vec<PayrollMonth> = data
        .payroll_months
        .iter()
        .filter(|m| m.company_id == company_id)
        .cloned()
        .collect();
    months.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(HttpResponse::Ok().json(months))
}

#[utoipa::path(
    get,
    path = "/api/payrollmonth/{id}",
    params(("id" = u32, Path, description = "Payroll month ID")),
    responses((status = 200, body = PayrollMonth), (status = 404)),
    tag = "PayrollMonth"
)]
pub async fn get_payroll_month(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let data = store.read().await;
    match data.payroll_month(path.into_inner()) {
        Some(month) => Ok(HttpResponse::Ok().json(month)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[utoipa::path(
    post,
    path = "/api/payrollmonth",
    request_body = CreatePayrollMonthRequest,
    responses((status = 201, body = PayrollMonth)),
    tag = "PayrollMonth"
)]
pub async fn create_payroll_month(
    store: web::Data<Store>,
    payload: web::Json<CreatePayrollMonthRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let month = store
        .mutate(|data| {
            let id = data.next_id();
            let month = PayrollMonth {
                id,
                company_id: payload.company_id,
                month: payload.month.clone(),
                total_days: payload.total_days.unwrap_or(DEFAULT_TOTAL_DAYS),
            };
            data.payroll_months.push(month.clone());
            month
        })
        .await;
    Ok(HttpResponse::Created().json(month))
}

#[utoipa::path(
    put,
    path = "/api/payrollmonth/{id}",
    request_body = PayrollMonth,
    params(("id" = u32, Path, description = "Payroll month ID")),
    responses((status = 204), (status = 400, description = "ID mismatch"), (status = 404)),
    tag = "PayrollMonth"
)]
pub async fn update_payroll_month(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<PayrollMonth>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    if id != payload.id {
        return Ok(HttpResponse::BadRequest().finish());
    }

    let found = store
        .mutate(|data| {
            if let Some(month) = data.payroll_month_mut(id) {
                *month = payload.clone();
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

/// Hard delete; the month's payroll entries cascade away.
#[utoipa::path(
    delete,
    path = "/api/payrollmonth/{id}",
    params(("id" = u32, Path, description = "Payroll month ID")),
    responses((status = 204), (status = 404)),
    tag = "PayrollMonth"
)]
pub async fn delete_payroll_month(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let removed = store
        .mutate(|data| data.remove_payroll_month(id).is_some())
        .await;
    if removed {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound()
            .json(json!({ "message": format!("Payroll month with ID {id} not found.") })))
    }
}
