use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::model::{Employee, PayrollEntry, PayrollMonth};
use crate::sheet::{probe_header, Sheet};
use crate::store::Dataset;

/// Columns the payroll ledger must carry. PF and ESI are an either/or pair;
/// everything else is mandatory.
const COL_PF: &str = "pf";
const COL_ESI: &str = "esi";
const COL_NAME: &str = "name";
const COL_WORKING_DAYS: &str = "working_days";
const COL_BASIC: &str = "basic";
const COL_GROSS: &str = "gross_salary";

#[derive(Debug)]
pub enum ReconcileError {
    /// Neither candidate header row carried all required columns.
    MissingColumns(Vec<String>),
    /// Per-row parse/lookup failures; the upload is all-or-nothing, so any
    /// of these rejects the whole file.
    RowErrors(Vec<String>),
}

struct LedgerColumns {
    header_row: u32,
    pf: Option<u32>,
    esi: Option<u32>,
    name: Option<u32>,
    working_days: Option<u32>,
    basic: Option<u32>,
    gross: Option<u32>,
}

fn required_missing(columns: &HashMap<String, u32>) -> Vec<String> {
    let mut missing = Vec::new();
    if !columns.contains_key(COL_PF) && !columns.contains_key(COL_ESI) {
        missing.push("pf or esi".to_string());
    }
    for col in [COL_NAME, COL_WORKING_DAYS, COL_BASIC, COL_GROSS] {
        if !columns.contains_key(col) {
            missing.push(col.to_string());
        }
    }
    missing
}

fn resolve_columns(sheet: &dyn Sheet) -> Result<LedgerColumns, ReconcileError> {
    let res = probe_header(sheet, &[1, 2], required_missing);
    if !res.missing.is_empty() {
        return Err(ReconcileError::MissingColumns(res.missing));
    }
    Ok(LedgerColumns {
        header_row: res.header_row,
        pf: res.columns.get(COL_PF).copied(),
        esi: res.columns.get(COL_ESI).copied(),
        name: res.columns.get(COL_NAME).copied(),
        working_days: res.columns.get(COL_WORKING_DAYS).copied(),
        basic: res.columns.get(COL_BASIC).copied(),
        gross: res.columns.get(COL_GROSS).copied(),
    })
}

fn read(sheet: &dyn Sheet, row: u32, col: Option<u32>) -> String {
    col.map(|c| sheet.cell(row, c).trim().to_string())
        .unwrap_or_default()
}

/// Matches an uploaded identifier pair against the company's employee master:
/// exact case-insensitive comparison of the trimmed PF or ESI number.
fn find_employee<'a>(
    employees: &'a [&'a Employee],
    pf: Option<&str>,
    esi: Option<&str>,
) -> Option<&'a Employee> {
    employees
        .iter()
        .find(|e| {
            let pf_hit = pf.is_some_and(|p| {
                let master = e.pf_number.trim();
                !master.is_empty() && master.eq_ignore_ascii_case(p)
            });
            let esi_hit = esi.is_some_and(|s| {
                let master = e.esi_number.trim();
                !master.is_empty() && master.eq_ignore_ascii_case(s)
            });
            pf_hit || esi_hit
        })
        .copied()
}

fn clamp_ncp(total_days: u32, working_days: Decimal) -> Decimal {
    (Decimal::from(total_days) - working_days).max(Decimal::ZERO)
}

/// Parses the uploaded ledger and produces the complete entry set for the
/// month: one entry per matched row plus a zero-attendance entry for every
/// active, not-left employee the file omitted. Entries come back with id 0;
/// `replace_month_entries` assigns ids when persisting.
pub fn reconcile(
    sheet: &dyn Sheet,
    data: &Dataset,
    company_id: u32,
    month: &PayrollMonth,
) -> Result<Vec<PayrollEntry>, ReconcileError> {
    let cols = resolve_columns(sheet)?;
    let master: Vec<&Employee> = data.company_employees(company_id).collect();

    let mut entries: Vec<PayrollEntry> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    let mut row_num = cols.header_row + 1;
    loop {
        let mut pf_number = read(sheet, row_num, cols.pf);
        let mut esi_number = read(sheet, row_num, cols.esi);
        let name = read(sheet, row_num, cols.name);
        let working_days_str = read(sheet, row_num, cols.working_days);
        let basic_str = read(sheet, row_num, cols.basic);
        let gross_str = read(sheet, row_num, cols.gross);

        // End-of-data sentinel: first row with both identifiers blank. Rows
        // below it are never read, matching the append-only sheet convention.
        if pf_number.is_empty() && esi_number.is_empty() {
            break;
        }

        // Sheet number for error messages, 1-based relative to the header.
        let sheet_row = row_num - cols.header_row;
        row_num += 1;

        if pf_number.eq_ignore_ascii_case("nil") {
            pf_number.clear();
        }
        if esi_number.eq_ignore_ascii_case("nil") {
            esi_number.clear();
        }

        let working_days = match Decimal::from_str(&working_days_str) {
            Ok(v) => v,
            Err(_) => {
                errors.push(format!(
                    "Row {sheet_row}: Invalid present days '{working_days_str}' for employee '{name}'"
                ));
                continue;
            }
        };
        let basic_da = match Decimal::from_str(&basic_str) {
            Ok(v) => v,
            Err(_) => {
                errors.push(format!(
                    "Row {sheet_row}: Invalid basic salary '{basic_str}' for employee '{name}'"
                ));
                continue;
            }
        };
        let gross_salary = match Decimal::from_str(&gross_str) {
            Ok(v) => v,
            Err(_) => {
                errors.push(format!(
                    "Row {sheet_row}: Invalid gross salary '{gross_str}' for employee '{name}'"
                ));
                continue;
            }
        };

        let pf = (!pf_number.is_empty()).then_some(pf_number.as_str());
        let esi = (!esi_number.is_empty()).then_some(esi_number.as_str());
        if pf.is_none() && esi.is_none() {
            errors.push(format!(
                "Row {sheet_row}: No valid PF or ESI number for employee '{name}'"
            ));
            continue;
        }

        let employee = match find_employee(&master, pf, esi) {
            Some(e) => e,
            None => {
                let identifier = match pf {
                    Some(p) => format!("PF: '{p}'"),
                    None => format!("ESI: '{}'", esi.unwrap_or_default()),
                };
                errors.push(format!(
                    "Row {sheet_row}: Employee with {identifier} not found in master table"
                ));
                continue;
            }
        };

        entries.push(PayrollEntry {
            id: 0,
            employee_id: employee.id,
            company_id,
            payroll_month_id: month.id,
            working_days,
            basic_da,
            gross_salary,
            ncp: clamp_ncp(month.total_days, working_days),
            reason: 0,
        });
    }

    backfill_missing(&master, month, company_id, &mut entries);

    if !errors.is_empty() {
        return Err(ReconcileError::RowErrors(errors));
    }
    Ok(entries)
}

/// Every active employee without a leaving date must appear in the month.
/// Omitted ones get a zero-attendance entry so company coverage is complete.
fn backfill_missing(
    master: &[&Employee],
    month: &PayrollMonth,
    company_id: u32,
    entries: &mut Vec<PayrollEntry>,
) {
    let uploaded: Vec<u32> = entries.iter().map(|e| e.employee_id).collect();
    for employee in master {
        if !employee.is_active
            || employee.leaving_date.is_some()
            || uploaded.contains(&employee.id)
        {
            continue;
        }
        entries.push(PayrollEntry {
            id: 0,
            employee_id: employee.id,
            company_id,
            payroll_month_id: month.id,
            working_days: Decimal::ZERO,
            basic_da: Decimal::ZERO,
            gross_salary: Decimal::ZERO,
            ncp: Decimal::from(month.total_days),
            reason: 0,
        });
    }
}

/// Full replace for the (company, month) pair: drop whatever was persisted
/// for it, then insert the new set. Never a merge.
pub fn replace_month_entries(
    data: &mut Dataset,
    company_id: u32,
    payroll_month_id: u32,
    entries: Vec<PayrollEntry>,
) -> usize {
    data.payroll_entries
        .retain(|p| !(p.company_id == company_id && p.payroll_month_id == payroll_month_id));
    let count = entries.len();
    for mut entry in entries {
        entry.id = data.next_id();
        data.payroll_entries.push(entry);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Company;
    use crate::sheet::CsvSheet;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn setup() -> (Dataset, PayrollMonth) {
        let mut data = Dataset::default();
        let company_id = data.next_id();
        data.companies.push(Company {
            id: company_id,
            name: "Acme".into(),
            pf_enabled: true,
            esi_enabled: true,
            organization_id: None,
        });
        let month_id = data.next_id();
        let month = PayrollMonth {
            id: month_id,
            company_id,
            month: "August 2025".into(),
            total_days: 30,
        };
        data.payroll_months.push(month.clone());
        (data, month)
    }

    fn add_emp(
        data: &mut Dataset,
        name: &str,
        pf: &str,
        esi: &str,
        leaving: Option<NaiveDate>,
    ) -> u32 {
        let id = data.next_id();
        data.employees.push(Employee {
            id,
            company_id: 1,
            name: name.into(),
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            leaving_date: leaving,
            pf_number: pf.into(),
            esi_number: esi.into(),
            is_active: true,
            error: None,
        });
        id
    }

    fn sheet(text: &str) -> CsvSheet {
        CsvSheet::open(text.as_bytes()).unwrap()
    }

    #[test]
    fn happy_path_computes_ncp() {
        let (mut data, month) = setup();
        let e = add_emp(&mut data, "A", "PF1", "E1", None);
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,22,18000,25000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].employee_id, e);
        assert_eq!(entries[0].ncp, dec!(8));
        assert_eq!(entries[0].reason, 0);
    }

    #[test]
    fn over_reported_days_clamp_ncp_to_zero() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "E1", None);
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,31,18000,25000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries[0].ncp, dec!(0));
    }

    #[test]
    fn header_on_second_row_is_found() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "E1", None);
        let s = sheet(
            "Acme Wage Ledger August 2025\npf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,20,15000,20000\n",
        );
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].working_days, dec!(20));
    }

    #[test]
    fn missing_columns_are_listed() {
        let (data, month) = setup();
        let s = sheet("name,basic\nA,18000\n");
        match reconcile(&s, &data, 1, &month) {
            Err(ReconcileError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["pf or esi", "working_days", "gross_salary"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn blank_identifier_row_stops_reading() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "E1", None);
        add_emp(&mut data, "B", "PF2", "E2", None);
        // Row after the blank one is populated but must never be read.
        let s = sheet(
            "pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,20,15000,20000\n,,,,,\nPF2,E2,B,bad,15000,20000\n",
        );
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        // B is backfilled as absent, not read from the sheet.
        assert_eq!(entries.len(), 2);
        let b = entries.iter().find(|e| e.employee_id == 4).unwrap();
        assert_eq!(b.working_days, dec!(0));
        assert_eq!(b.ncp, dec!(30));
    }

    #[test]
    fn nil_identifiers_normalize_to_blank() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "NIL", None);
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,Nil,A,20,15000,20000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries[0].employee_id, 3);
    }

    #[test]
    fn parse_and_lookup_errors_reject_the_upload() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "E1", None);
        let s = sheet(
            "pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,twenty,15000,20000\nPF9,E9,X,20,15000,20000\n",
        );
        match reconcile(&s, &data, 1, &month) {
            Err(ReconcileError::RowErrors(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(
                    errors[0],
                    "Row 1: Invalid present days 'twenty' for employee 'A'"
                );
                assert_eq!(
                    errors[1],
                    "Row 2: Employee with PF: 'PF9' not found in master table"
                );
            }
            other => panic!("expected RowErrors, got {other:?}"),
        }
    }

    #[test]
    fn case_insensitive_identifier_match() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", " pf1 ", "E1", None);
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,,A,20,15000,20000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries[0].employee_id, 3);
    }

    #[test]
    fn employees_with_leaving_date_are_not_backfilled() {
        let (mut data, month) = setup();
        add_emp(&mut data, "A", "PF1", "E1", None);
        add_emp(
            &mut data,
            "Left",
            "PF2",
            "E2",
            NaiveDate::from_ymd_opt(2025, 6, 30),
        );
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,20,15000,20000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn replace_is_wholesale_not_a_merge() {
        let (mut data, month) = setup();
        let a = add_emp(&mut data, "A", "PF1", "E1", None);
        let b = add_emp(&mut data, "B", "PF2", "E2", None);

        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF1,E1,A,20,15000,20000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        replace_month_entries(&mut data, 1, month.id, entries);
        assert_eq!(data.month_entries(1, month.id).count(), 2);

        // Second upload only mentions B; A must not linger from round one.
        let s = sheet("pf,esi,name,working_days,basic,gross_salary\nPF2,E2,B,25,16000,21000\n");
        let entries = reconcile(&s, &data, 1, &month).unwrap();
        replace_month_entries(&mut data, 1, month.id, entries);

        let now: Vec<&PayrollEntry> = data.month_entries(1, month.id).collect();
        assert_eq!(now.len(), 2);
        let a_entry = now.iter().find(|e| e.employee_id == a).unwrap();
        assert_eq!(a_entry.working_days, dec!(0)); // backfilled, not stale
        let b_entry = now.iter().find(|e| e.employee_id == b).unwrap();
        assert_eq!(b_entry.working_days, dec!(25));
    }
}
