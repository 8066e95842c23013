use std::collections::{HashMap, HashSet};

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::model::Employee;
use crate::rules::validation::{revalidate_company, validate_employee};
use crate::sheet::{CsvSheet, Sheet, probe_header};
use crate::store::{Dataset, Store};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub company_id: u32,

    #[schema(example = "RAHUL SHARMA")]
    pub name: String,

    #[schema(value_type = String, format = "date")]
    pub joining_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub leaving_date: Option<NaiveDate>,

    pub pf_number: String,
    pub esi_number: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct EmployeeQuery {
    #[serde(rename = "searchName")]
    pub search_name: Option<String>,

    #[serde(rename = "searchPF")]
    pub search_pf: Option<String>,

    #[serde(rename = "searchESI")]
    pub search_esi: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Exact-duplicate probe used at insert time: same company, name, PF and ESI.
/// Distinct from the validation rules; these rows never reach the table.
fn exact_duplicate(data: &Dataset, row: &Employee) -> bool {
    data.employees.iter().any(|e| {
        e.company_id == row.company_id
            && e.name == row.name
            && e.pf_number == row.pf_number
            && e.esi_number == row.esi_number
    })
}

#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, body = Employee),
        (status = 409, description = "Employee already exists")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    store: web::Data<Store>,
    payload: web::Json<CreateEmployeeRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let created = store
        .transact(|data| {
            let mut row = Employee {
                id: 0,
                company_id: payload.company_id,
                name: payload.name.clone(),
                joining_date: payload.joining_date,
                leaving_date: payload.leaving_date,
                pf_number: payload.pf_number.clone(),
                esi_number: payload.esi_number.clone(),
                is_active: payload.is_active,
                error: None,
            };
            if exact_duplicate(data, &row) {
                return Err(());
            }
            row.id = data.next_id();
            let id = row.id;
            data.employees.push(row);
            revalidate_company(data, payload.company_id);
            Ok(data.employee(id).cloned())
        })
        .await;

    match created {
        Ok(Some(employee)) => Ok(HttpResponse::Created().json(employee)),
        Ok(None) => Ok(HttpResponse::InternalServerError().finish()),
        Err(()) => {
            Ok(HttpResponse::Conflict().json(json!({ "message": "Employee already exists." })))
        }
    }
}

/// Bulk employee-master upload. Columns `name`, `joining_date`, `pf` and
/// `esi` are required (header on row 1 or 2), `leaving_date` is optional.
/// Reading stops at the first blank name. Rows that exactly match a persisted
/// employee are skipped silently; everything else is inserted carrying its
/// validation verdict, then the pre-existing rows are re-checked against the
/// grown table.
#[utoipa::path(
    post,
    path = "/api/employee/upload/{company_id}",
    request_body(content = String, content_type = "text/csv"),
    params(("company_id" = u32, Path, description = "Company ID")),
    responses(
        (status = 200),
        (status = 400, description = "Missing columns or unreadable file")
    ),
    tag = "Employee"
)]
pub async fn upload_employees(
    store: web::Data<Store>,
    path: web::Path<u32>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();

    let sheet = match CsvSheet::open(&body) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, company_id, "employee upload: unreadable file");
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "message": format!("Error processing file: {e}") })));
        }
    };

    let resolution = probe_header(&sheet, &[1, 2], |cols| {
        ["name", "joining_date", "pf", "esi"]
            .iter()
            .filter(|c| !cols.contains_key(**c))
            .map(|c| c.to_string())
            .collect()
    });
    if !resolution.missing.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Missing required column(s): {}", resolution.missing.join(", "))
        })));
    }

    let parsed = read_employee_rows(&sheet, &resolution.columns, resolution.header_row, company_id);

    let inserted = store
        .mutate(|data| {
            let existing_ids: Vec<u32> = data.company_employees(company_id).map(|e| e.id).collect();

            // Provisional ids give batch rows a distinct identity for the
            // in-batch duplicate checks.
            let mut batch = parsed;
            for row in &mut batch {
                row.id = data.next_id();
            }
            let verdicts: Vec<Option<String>> = batch
                .iter()
                .map(|row| validate_employee(row, &batch, data))
                .collect();

            let mut inserted = 0usize;
            for (mut row, verdict) in batch.into_iter().zip(verdicts) {
                if exact_duplicate(data, &row) {
                    continue;
                }
                row.error = verdict;
                data.employees.push(row);
                inserted += 1;
            }

            // Fresh rows keep the verdict computed against the batch; only
            // the rows that were already there get re-checked.
            for id in existing_ids {
                if let Some(row) = data.employee(id).cloned() {
                    let verdict = validate_employee(&row, &[], data);
                    if let Some(stored) = data.employee_mut(id) {
                        stored.error = verdict;
                    }
                }
            }
            inserted
        })
        .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employees uploaded successfully",
        "uploadedCount": inserted
    })))
}

fn read_employee_rows(
    sheet: &dyn Sheet,
    columns: &HashMap<String, u32>,
    header_row: u32,
    company_id: u32,
) -> Vec<Employee> {
    let read = |row: u32, name: &str| -> String {
        columns
            .get(name)
            .map(|&c| sheet.cell(row, c).trim().to_string())
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    let mut row_num = header_row + 1;
    loop {
        let name = read(row_num, "name");
        if name.is_empty() {
            break;
        }
        let leaving = {
            let raw = read(row_num, "leaving_date");
            if raw.is_empty() {
                None
            } else {
                parse_sheet_date(&raw)
            }
        };
        rows.push(Employee {
            id: 0,
            company_id,
            name,
            joining_date: parse_sheet_date(&read(row_num, "joining_date"))
                .unwrap_or(NaiveDate::MIN),
            leaving_date: leaving,
            pf_number: read(row_num, "pf"),
            esi_number: read(row_num, "esi"),
            is_active: true,
            error: None,
        });
        row_num += 1;
    }
    rows
}

/// Office sheets carry dates in a handful of shapes. An unparseable joining
/// date falls back to the epoch default rather than failing the whole row.
fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Bulk fix: full rows for existing employees, applied all-or-nothing, then
/// one re-validation pass per affected company.
#[utoipa::path(
    post,
    path = "/api/employee/update",
    request_body = [Employee],
    responses((status = 200, body = [Employee]), (status = 400), (status = 404)),
    tag = "Employee"
)]
pub async fn fix_employees(
    store: web::Data<Store>,
    payload: web::Json<Vec<Employee>>,
) -> actix_web::Result<impl Responder> {
    let fixes = payload.into_inner();
    let Some(first) = fixes.first() else {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "No rows provided." })));
    };
    let first_company = first.company_id;

    let res = store
        .transact(|data| {
            let mut companies: HashSet<u32> = HashSet::new();
            for fix in &fixes {
                let existing = data
                    .employee_mut(fix.id)
                    .ok_or_else(|| format!("Employee with ID {} not found.", fix.id))?;
                companies.insert(existing.company_id);
                companies.insert(fix.company_id);
                existing.company_id = fix.company_id;
                existing.name = fix.name.clone();
                existing.joining_date = fix.joining_date;
                existing.leaving_date = fix.leaving_date;
                existing.pf_number = fix.pf_number.clone();
                existing.esi_number = fix.esi_number.clone();
            }
            for company_id in companies {
                revalidate_company(data, company_id);
            }
            Ok::<_, String>(
                data.company_employees(first_company)
                    .cloned()
                    .collect::<Vec<Employee>>(),
            )
        })
        .await;

    match res {
        Ok(updated) => Ok(HttpResponse::Ok().json(updated)),
        Err(msg) => Ok(HttpResponse::NotFound().json(json!({ "message": msg }))),
    }
}

#[utoipa::path(
    put,
    path = "/api/employee/{id}",
    request_body = Employee,
    params(("id" = u32, Path, description = "Employee ID")),
    responses(
        (status = 200, body = Employee),
        (status = 400, description = "ID mismatch"),
        (status = 404)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    store: web::Data<Store>,
    path: web::Path<u32>,
    payload: web::Json<Employee>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    if id != payload.id {
        return Ok(HttpResponse::BadRequest().finish());
    }

    let res = store
        .transact(|data| {
            let existing = data
                .employee_mut(id)
                .ok_or_else(|| format!("Employee with ID {id} not found."))?;
            let old_company = existing.company_id;
            existing.company_id = payload.company_id;
            existing.name = payload.name.clone();
            existing.joining_date = payload.joining_date;
            existing.leaving_date = payload.leaving_date;
            existing.pf_number = payload.pf_number.clone();
            existing.esi_number = payload.esi_number.clone();
            existing.is_active = payload.is_active;

            revalidate_company(data, payload.company_id);
            if old_company != payload.company_id {
                revalidate_company(data, old_company);
            }
            data.employee(id)
                .cloned()
                .ok_or_else(|| format!("Employee with ID {id} not found."))
        })
        .await;

    match res {
        Ok(employee) => Ok(HttpResponse::Ok().json(employee)),
        Err(msg) => Ok(HttpResponse::NotFound().json(json!({ "message": msg }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/employee/{company_id}",
    params(("company_id" = u32, Path, description = "Company ID"), EmployeeQuery),
    responses((status = 200, body = [Employee])),
    tag = "Employee"
)]
pub async fn list_employees(
    store: web::Data<Store>,
    path: web::Path<u32>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();
    let data = store.read().await;

    let matches = |haystack: &str, needle: &Option<String>| {
        needle.as_deref().is_none_or(|n| {
            n.trim().is_empty() || haystack.to_lowercase().contains(&n.trim().to_lowercase())
        })
    };

    let mut employees: Vec<Employee> = data
        .company_employees(company_id)
        .filter(|e| {
            matches(&e.name, &query.search_name)
                && matches(&e.pf_number, &query.search_pf)
                && matches(&e.esi_number, &query.search_esi)
        })
        .cloned()
        .collect();
    employees.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(HttpResponse::Ok().json(employees))
}

/// The fix-up screen: every row of the company, errored ones first.
#[utoipa::path(
    get,
    path = "/api/employee/has-errors/{company_id}",
    params(("company_id" = u32, Path, description = "Company ID")),
    responses((status = 200)),
    tag = "Employee"
)]
pub async fn employees_with_errors(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();
    let data = store.read().await;

    let mut rows: Vec<&Employee> = data.company_employees(company_id).collect();
    rows.sort_by(|a, b| {
        let a_clean = a.error.as_deref().unwrap_or("").is_empty();
        let b_clean = b.error.as_deref().unwrap_or("").is_empty();
        a_clean.cmp(&b_clean).then_with(|| a.name.cmp(&b.name))
    });
    Ok(HttpResponse::Ok().json(json!({ "rows": rows })))
}

/// Hard delete; the employee's payroll entries cascade away and the rest of
/// the company is re-validated.
#[utoipa::path(
    delete,
    path = "/api/employee/{id}",
    params(("id" = u32, Path, description = "Employee ID")),
    responses((status = 204), (status = 404)),
    tag = "Employee"
)]
pub async fn delete_employee(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let removed = store
        .mutate(|data| {
            let removed = data.remove_employee(id)?;
            revalidate_company(data, removed.company_id);
            Some(())
        })
        .await;

    if removed.is_some() {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}

#[utoipa::path(
    delete,
    path = "/api/employee/company/{company_id}",
    params(("company_id" = u32, Path, description = "Company ID")),
    responses((status = 200), (status = 404)),
    tag = "Employee"
)]
pub async fn delete_company_employees(
    store: web::Data<Store>,
    path: web::Path<u32>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();
    let count = store
        .mutate(|data| {
            let ids: Vec<u32> = data.company_employees(company_id).map(|e| e.id).collect();
            for id in &ids {
                data.remove_employee(*id);
            }
            ids.len()
        })
        .await;

    if count == 0 {
        Ok(HttpResponse::NotFound()
            .json(json!({ "message": format!("No employees found for company ID {company_id}.") })))
    } else {
        Ok(HttpResponse::Ok().json(json!({
            "message": format!("Deleted {count} employees for company ID {company_id}.")
        })))
    }
}
