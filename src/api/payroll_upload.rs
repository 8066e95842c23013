use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::model::{Employee, PayrollEntry};
use crate::rules::reconcile::{ReconcileError, reconcile, replace_month_entries};
use crate::rules::report::{RenderError, ReportFile, entries_missing_reason, render_ecr, render_esi};
use crate::rules::validation::company_has_errors;
use crate::sheet::CsvSheet;
use crate::store::{Dataset, Store};

const FIX_ERRORS_FIRST: &str =
    "Cannot upload payroll. Please fix all employee master errors first.";

#[derive(Deserialize, IntoParams)]
pub struct EntryQuery {
    #[serde(rename = "searchName")]
    pub search_name: Option<String>,

    #[serde(rename = "searchPF")]
    pub search_pf: Option<String>,

    #[serde(rename = "searchESI")]
    pub search_esi: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    pub employee_id: u32,

    #[schema(value_type = f64, example = 22.0)]
    pub working_days: Decimal,

    #[schema(value_type = f64, example = 18000.0)]
    pub basic_da: Decimal,

    #[schema(value_type = f64, example = 25000.0)]
    pub gross_salary: Decimal,

    #[serde(default)]
    pub reason: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEntryRequest {
    #[schema(value_type = f64, example = 22.0)]
    pub working_days: Decimal,

    #[schema(value_type = f64, example = 18000.0)]
    pub basic_da: Decimal,

    #[schema(value_type = f64, example = 25000.0)]
    pub gross_salary: Decimal,

    #[serde(default)]
    pub reason: i32,
}

/// Entry row as the screens consume it: the wage figures with the owning
/// employee's identifying fields alongside.
#[derive(Serialize, ToSchema)]
pub struct EntryResponse {
    pub id: u32,
    pub employee_id: u32,
    pub company_id: u32,
    pub payroll_month_id: u32,

    #[schema(value_type = f64)]
    pub working_days: Decimal,

    #[schema(value_type = f64)]
    pub basic_da: Decimal,

    #[schema(value_type = f64)]
    pub gross_salary: Decimal,

    #[schema(value_type = f64)]
    pub ncp: Decimal,

    pub reason: i32,
    pub employee_name: String,
    pub pf_number: String,
    pub esi_number: String,
    pub has_leaving_date: bool,
}

fn project(entry: &PayrollEntry, employee: &Employee) -> EntryResponse {
    EntryResponse {
        id: entry.id,
        employee_id: entry.employee_id,
        company_id: entry.company_id,
        payroll_month_id: entry.payroll_month_id,
        working_days: entry.working_days,
        basic_da: entry.basic_da,
        gross_salary: entry.gross_salary,
        ncp: entry.ncp,
        reason: entry.reason,
        employee_name: employee.name.clone(),
        pf_number: employee.pf_number.clone(),
        esi_number: employee.esi_number.clone(),
        has_leaving_date: employee.leaving_date.is_some(),
    }
}

fn recompute_ncp(data: &Dataset, payroll_month_id: u32, working_days: Decimal) -> Decimal {
    let total_days = data
        .payroll_month(payroll_month_id)
        .map(|m| m.total_days)
        .unwrap_or_default();
    (Decimal::from(total_days) - working_days).max(Decimal::ZERO)
}

#[utoipa::path(
    get,
    path = "/api/payroll-upload/can-upload/{company_id}",
    params(("company_id" = u32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Upload allowed"),
        (status = 400, description = "Employee master has errors")
    ),
    tag = "Payroll"
)]
pub async fn can_upload(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();
    let data = store.read().await;
    if company_has_errors(&data, company_id) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": FIX_ERRORS_FIRST,
            "canUpload": false
        })));
    }
    Ok(HttpResponse::Ok().json(json!({ "canUpload": true })))
}

/// Ledger upload for one (company, month). Gate, reconcile, then replace the
/// month's entry set in one transaction; any row error rejects the lot.
#[utoipa::path(
    post,
    path = "/api/payroll-upload/upload/{company_id}/{month_id}",
    request_body(content = String, content_type = "text/csv"),
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID")
    ),
    responses(
        (status = 200, description = "Uploaded"),
        (status = 400, description = "Gate failure, missing columns or row errors")
    ),
    tag = "Payroll"
)]
pub async fn upload_payroll(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();

    let sheet = match CsvSheet::open(&body) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, company_id, month_id, "payroll upload: unreadable file");
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "message": format!("Error processing file: {e}") })));
        }
    };

    enum Fail {
        Gate,
        BadMonth,
        Reconcile(ReconcileError),
    }

    let res = store
        .transact(|data| {
            if company_has_errors(data, company_id) {
                return Err(Fail::Gate);
            }
            let month = data
                .payroll_month(month_id)
                .filter(|m| m.company_id == company_id)
                .cloned()
                .ok_or(Fail::BadMonth)?;
            let entries = reconcile(&sheet, data, company_id, &month).map_err(Fail::Reconcile)?;
            let total_employees = entries.len();
            let uploaded = replace_month_entries(data, company_id, month_id, entries);
            Ok((uploaded, total_employees))
        })
        .await;

    match res {
        Ok((uploaded, total)) => {
            info!(company_id, month_id, uploaded, "payroll upload committed");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Payroll uploaded successfully",
                "uploadedCount": uploaded,
                "totalEmployees": total
            })))
        }
        Err(Fail::Gate) => Ok(HttpResponse::BadRequest().json(json!({
            "message": FIX_ERRORS_FIRST,
            "canUpload": false
        }))),
        Err(Fail::BadMonth) => {
            Ok(HttpResponse::BadRequest().json(json!({ "message": "Invalid payroll month." })))
        }
        Err(Fail::Reconcile(ReconcileError::MissingColumns(missing))) => {
            Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Missing required column(s): {}", missing.join(", "))
            })))
        }
        Err(Fail::Reconcile(ReconcileError::RowErrors(errors))) => {
            let total = errors.len();
            Ok(HttpResponse::BadRequest().json(json!({
                "message": "Upload failed with errors. Please fix the data and re-upload.",
                "errors": errors,
                "uploadedCount": 0,
                "totalErrors": total
            })))
        }
    }
}

/// Entries of one (company, month): active employees only, zero-attendance
/// rows first so the reason-code fixups sit on top, then by name.
#[utoipa::path(
    get,
    path = "/api/payroll-upload/payroll/{company_id}/{month_id}",
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID"),
        EntryQuery
    ),
    responses((status = 200, body = [EntryResponse])),
    tag = "Payroll"
)]
pub async fn list_entries(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
    query: web::Query<EntryQuery>,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();
    let data = store.read().await;

    let matches = |haystack: &str, needle: &Option<String>| {
        needle.as_deref().is_none_or(|n| {
            n.trim().is_empty() || haystack.to_lowercase().contains(&n.trim().to_lowercase())
        })
    };

    let mut rows: Vec<EntryResponse> = data
        .month_entries(company_id, month_id)
        .filter_map(|entry| data.employee(entry.employee_id).map(|e| (entry, e)))
        .filter(|(_, employee)| employee.is_active)
        .filter(|(_, employee)| {
            matches(&employee.name, &query.search_name)
                && matches(&employee.pf_number, &query.search_pf)
                && matches(&employee.esi_number, &query.search_esi)
        })
        .map(|(entry, employee)| project(entry, employee))
        .collect();
    rows.sort_by(|a, b| {
        let a_zero = a.working_days == Decimal::ZERO;
        let b_zero = b.working_days == Decimal::ZERO;
        b_zero
            .cmp(&a_zero)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/payroll-upload/add-entry/{company_id}/{month_id}",
    request_body = CreateEntryRequest,
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID")
    ),
    responses((status = 201, body = EntryResponse), (status = 400), (status = 409)),
    tag = "Payroll"
)]
pub async fn add_entry(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
    payload: web::Json<CreateEntryRequest>,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();
    let payload = payload.into_inner();

    let res = store
        .transact(|data| {
            if data
                .payroll_month(month_id)
                .filter(|m| m.company_id == company_id)
                .is_none()
            {
                return Err((400, "Invalid payroll month.".to_string()));
            }
            let employee = data
                .employee(payload.employee_id)
                .filter(|e| e.company_id == company_id)
                .cloned()
                .ok_or((400, "Invalid employee.".to_string()))?;
            if data
                .month_entries(company_id, month_id)
                .any(|e| e.employee_id == payload.employee_id)
            {
                return Err((
                    409,
                    "Payroll entry already exists for this employee.".to_string(),
                ));
            }
            let ncp = recompute_ncp(data, month_id, payload.working_days);
            let id = data.next_id();
            let entry = PayrollEntry {
                id,
                employee_id: payload.employee_id,
                company_id,
                payroll_month_id: month_id,
                working_days: payload.working_days,
                basic_da: payload.basic_da,
                gross_salary: payload.gross_salary,
                ncp,
                reason: payload.reason,
            };
            data.payroll_entries.push(entry.clone());
            Ok(project(&entry, &employee))
        })
        .await;

    match res {
        Ok(row) => Ok(HttpResponse::Created().json(row)),
        Err((409, msg)) => Ok(HttpResponse::Conflict().json(json!({ "message": msg }))),
        Err((_, msg)) => Ok(HttpResponse::BadRequest().json(json!({ "message": msg }))),
    }
}

#[utoipa::path(
    put,
    path = "/api/payroll-upload/update-entry/{id}",
    request_body = UpdateEntryRequest,
    params(("id" = u32, Path, description = "Payroll entry ID")),
    responses((status = 200, body = EntryResponse), (status = 404)),
    tag = "Payroll"
)]
pub async fn update_entry(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<UpdateEntryRequest>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    let res = store
        .transact(|data| {
            let month_id = data.payroll_entry(id).ok_or(())?.payroll_month_id;
            let ncp = recompute_ncp(data, month_id, payload.working_days);
            let entry = data.payroll_entry_mut(id).ok_or(())?;
            entry.working_days = payload.working_days;
            entry.basic_da = payload.basic_da;
            entry.gross_salary = payload.gross_salary;
            entry.reason = payload.reason;
            entry.ncp = ncp;
            let entry = entry.clone();
            let employee = data.employee(entry.employee_id).ok_or(())?;
            Ok(project(&entry, employee))
        })
        .await;

    match res {
        Ok(row) => Ok(HttpResponse::Ok().json(row)),
        Err(()) => Ok(HttpResponse::NotFound().finish()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/payroll-upload/delete-entry/{id}",
    params(("id" = u32, Path, description = "Payroll entry ID")),
    responses((status = 204), (status = 404)),
    tag = "Payroll"
)]
pub async fn delete_entry(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let removed = store
        .mutate(|data| data.remove_payroll_entry(id).is_some())
        .await;
    if removed {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}

/// Pre-download gate: the employee master must be clean and every
/// zero-attendance entry of a still-employed person needs a reason code.
#[utoipa::path(
    get,
    path = "/api/payroll-upload/can-download/{company_id}/{month_id}",
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID")
    ),
    responses(
        (status = 200, description = "Download allowed"),
        (status = 400, description = "Master errors or missing reason codes")
    ),
    tag = "Payroll"
)]
pub async fn can_download(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();
    let data = store.read().await;
    if company_has_errors(&data, company_id) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cannot download reports. Please fix all employee master errors first.",
            "canDownload": false
        })));
    }
    if entries_missing_reason(&data, company_id, month_id) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Some employees have zero working days without a reason code. Please update them before downloading.",
            "canDownload": false
        })));
    }
    Ok(HttpResponse::Ok().json(json!({ "canDownload": true })))
}

fn attachment(file: ReportFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file.filename),
        ))
        .body(file.bytes)
}

fn render_failure(company_id: u32, month_id: u32, which: &str, err: RenderError) -> HttpResponse {
    match err {
        RenderError::NoEligibleRows => HttpResponse::BadRequest().json(json!({
            "message": "No eligible employees found for this report."
        })),
        RenderError::Render(msg) => {
            error!(company_id, month_id, report = which, error = %msg, "report render failed");
            HttpResponse::InternalServerError()
                .json(json!({ "message": "Failed to generate report." }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll-upload/download-pf/{company_id}/{month_id}",
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID")
    ),
    responses(
        (status = 200, description = "ECR challan text file", content_type = "text/plain"),
        (status = 400)
    ),
    tag = "Payroll"
)]
pub async fn download_pf(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();
    let data = store.read().await;
    if company_has_errors(&data, company_id) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cannot download reports. Please fix all employee master errors first."
        })));
    }
    match render_ecr(&data, company_id, month_id) {
        Ok(file) => Ok(attachment(file)),
        Err(err) => Ok(render_failure(company_id, month_id, "ecr", err)),
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll-upload/download-esi/{company_id}/{month_id}",
    params(
        ("company_id" = u32, Path, description = "Company ID"),
        ("month_id" = u32, Path, description = "Payroll month ID")
    ),
    responses(
        (status = 200, description = "ESI return CSV file", content_type = "text/csv"),
        (status = 400)
    ),
    tag = "Payroll"
)]
pub async fn download_esi(
    store: web::Data<Store>,
    path: web::Path<(u32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, month_id) = path.into_inner();
    let data = store.read().await;
    if company_has_errors(&data, company_id) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cannot download reports. Please fix all employee master errors first."
        })));
    }
    let month = match data.payroll_month(month_id) {
        Some(m) => m.clone(),
        None => {
            return Ok(
                HttpResponse::BadRequest().json(json!({ "message": "Invalid payroll month." }))
            );
        }
    };
    match render_esi(&data, company_id, month_id, &month) {
        Ok(file) => Ok(attachment(file)),
        Err(err) => Ok(render_failure(company_id, month_id, "esi", err)),
    }
}
