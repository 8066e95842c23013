use crate::model::employee::esi_is_nil;
use crate::model::Employee;
use crate::store::Dataset;

/// First validation failure for one employee row, or `None` when the row is
/// clean. Checks run in a fixed order and short-circuit.
///
/// `batch` is the set of rows being considered together (a spreadsheet
/// upload); duplicates inside it surface as "...in upload.". Duplicates
/// against rows already persisted for the same company surface as
/// "...in database.". Outside a bulk upload pass `&[]`.
pub fn validate_employee(row: &Employee, batch: &[Employee], data: &Dataset) -> Option<String> {
    if row.name.trim().is_empty() {
        return Some("Name is required.".to_string());
    }

    let company = match data.company(row.company_id) {
        Some(c) => c,
        None => return Some("Invalid company.".to_string()),
    };

    if company.pf_enabled && row.pf_number.trim().is_empty() {
        return Some("PF Number required.".to_string());
    }

    // "NIL" means intentionally absent: satisfies the ESI requirement and
    // never takes part in duplicate detection.
    let esi_nil = esi_is_nil(&row.esi_number);
    if company.esi_enabled && row.esi_number.trim().is_empty() && !esi_nil {
        return Some("ESI Number required.".to_string());
    }

    let pf_present = !row.pf_number.trim().is_empty();
    let esi_counts = !esi_nil && !row.esi_number.trim().is_empty();

    if pf_present
        && batch
            .iter()
            .any(|x| x.id != row.id && x.pf_number == row.pf_number)
    {
        return Some("Duplicate PF Number in upload.".to_string());
    }
    if esi_counts
        && batch
            .iter()
            .any(|x| x.id != row.id && !esi_is_nil(&x.esi_number) && x.esi_number == row.esi_number)
    {
        return Some("Duplicate ESI Number in upload.".to_string());
    }

    if pf_present
        && data.employees.iter().any(|x| {
            x.company_id == row.company_id && x.id != row.id && x.pf_number == row.pf_number
        })
    {
        return Some("Duplicate PF Number in database.".to_string());
    }
    if esi_counts
        && data.employees.iter().any(|x| {
            x.company_id == row.company_id
                && x.id != row.id
                && !esi_is_nil(&x.esi_number)
                && x.esi_number == row.esi_number
        })
    {
        return Some("Duplicate ESI Number in database.".to_string());
    }

    None
}

/// Rewrites the `error` field of every employee in the company. A single
/// row's duplicate status depends on the whole set, so partial re-validation
/// would be incorrect; callers run this once per mutation batch, not per row.
pub fn revalidate_company(data: &mut Dataset, company_id: u32) {
    let rows: Vec<Employee> = data.company_employees(company_id).cloned().collect();
    for row in rows {
        let error = validate_employee(&row, &[], data);
        if let Some(stored) = data.employee_mut(row.id) {
            stored.error = error;
        }
    }
}

/// Live gate shared by payroll upload and report download: any row with a
/// persisted error blocks the operation.
pub fn company_has_errors(data: &Dataset, company_id: u32) -> bool {
    data.company_employees(company_id)
        .any(|e| e.error.as_deref().is_some_and(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Company;
    use chrono::NaiveDate;

    fn base_data(pf_enabled: bool, esi_enabled: bool) -> Dataset {
        let mut data = Dataset::default();
        let id = data.next_id();
        data.companies.push(Company {
            id,
            name: "Acme".into(),
            pf_enabled,
            esi_enabled,
            organization_id: None,
        });
        data
    }

    fn emp(data: &mut Dataset, name: &str, pf: &str, esi: &str) -> u32 {
        let id = data.next_id();
        data.employees.push(Employee {
            id,
            company_id: 1,
            name: name.into(),
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            leaving_date: None,
            pf_number: pf.into(),
            esi_number: esi.into(),
            is_active: true,
            error: None,
        });
        id
    }

    #[test]
    fn name_is_required() {
        let mut data = base_data(false, false);
        let id = emp(&mut data, "   ", "", "");
        let row = data.employee(id).unwrap().clone();
        assert_eq!(
            validate_employee(&row, &[], &data).as_deref(),
            Some("Name is required.")
        );
    }

    #[test]
    fn unknown_company_is_invalid() {
        let mut data = base_data(false, false);
        let id = emp(&mut data, "A", "", "");
        let mut row = data.employee(id).unwrap().clone();
        row.company_id = 99;
        assert_eq!(
            validate_employee(&row, &[], &data).as_deref(),
            Some("Invalid company.")
        );
    }

    #[test]
    fn pf_and_esi_requirements_follow_company_flags() {
        let mut data = base_data(true, true);
        let id = emp(&mut data, "A", "", "");
        let row = data.employee(id).unwrap().clone();
        assert_eq!(
            validate_employee(&row, &[], &data).as_deref(),
            Some("PF Number required.")
        );

        let mut row = row;
        row.pf_number = "PF1".into();
        assert_eq!(
            validate_employee(&row, &[], &data).as_deref(),
            Some("ESI Number required.")
        );
    }

    #[test]
    fn nil_sentinel_satisfies_esi_any_case() {
        let mut data = base_data(false, true);
        for (i, nil) in ["NIL", "nil", " Nil "].iter().enumerate() {
            let id = emp(&mut data, &format!("E{i}"), "", nil);
            let row = data.employee(id).unwrap().clone();
            assert_eq!(validate_employee(&row, &[], &data), None, "{nil:?}");
        }
    }

    #[test]
    fn nil_never_participates_in_duplicates() {
        let mut data = base_data(false, true);
        emp(&mut data, "A", "", "NIL");
        let id = emp(&mut data, "B", "", "NIL");
        let row = data.employee(id).unwrap().clone();
        assert_eq!(validate_employee(&row, &[], &data), None);
    }

    #[test]
    fn batch_duplicates_win_over_database_wording() {
        let mut data = base_data(true, false);
        let a = emp(&mut data, "A", "PF1", "");
        let b = emp(&mut data, "B", "PF1", "");
        let batch: Vec<Employee> = data.employees.clone();
        let row = data.employee(a).unwrap().clone();
        assert_eq!(
            validate_employee(&row, &batch, &data).as_deref(),
            Some("Duplicate PF Number in upload.")
        );
        let row = data.employee(b).unwrap().clone();
        assert_eq!(
            validate_employee(&row, &batch, &data).as_deref(),
            Some("Duplicate PF Number in upload.")
        );
    }

    #[test]
    fn persisted_duplicates_flag_both_rows() {
        let mut data = base_data(true, false);
        emp(&mut data, "A", "A1", "");
        emp(&mut data, "B", "A1", "");
        revalidate_company(&mut data, 1);
        for e in data.company_employees(1) {
            assert_eq!(e.error.as_deref(), Some("Duplicate PF Number in database."));
        }
    }

    #[test]
    fn duplicate_esi_in_database() {
        let mut data = base_data(false, true);
        emp(&mut data, "A", "", "E1");
        let id = emp(&mut data, "B", "", "E1");
        let row = data.employee(id).unwrap().clone();
        assert_eq!(
            validate_employee(&row, &[], &data).as_deref(),
            Some("Duplicate ESI Number in database.")
        );
    }

    #[test]
    fn revalidation_is_idempotent() {
        let mut data = base_data(true, true);
        emp(&mut data, "A", "A1", "E1");
        emp(&mut data, "B", "A1", "NIL");
        emp(&mut data, "", "A2", "E2");
        revalidate_company(&mut data, 1);
        let first: Vec<Option<String>> =
            data.company_employees(1).map(|e| e.error.clone()).collect();
        revalidate_company(&mut data, 1);
        let second: Vec<Option<String>> =
            data.company_employees(1).map(|e| e.error.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn errors_clear_after_fix() {
        let mut data = base_data(true, false);
        let a = emp(&mut data, "A", "A1", "");
        emp(&mut data, "B", "A1", "");
        revalidate_company(&mut data, 1);
        assert!(company_has_errors(&data, 1));

        data.employee_mut(a).unwrap().pf_number = "A2".into();
        revalidate_company(&mut data, 1);
        assert!(!company_has_errors(&data, 1));
    }
}
