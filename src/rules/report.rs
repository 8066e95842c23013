use chrono::Local;

use crate::model::{Employee, PayrollEntry, PayrollMonth};
use crate::rules::statutory::{ecr_figures, esi_wages, round_rupees};
use crate::store::Dataset;

/// ECR text files join fields with this literal, per the EPFO upload format.
const ECR_DELIMITER: &str = "#~#";

const ECR_HEADER: &str = "UAN#~#Employee Name#~#Gross Wages#~#EPF Wages#~#EPS Wages#~#EDLI Wages#~#EE Share#~#EPS Contribution#~#ER Share#~#NCP Days#~#Reason#~#Refund";

const ESI_HEADER: [&str; 6] = [
    "IP Number",
    "IP Name",
    "Days",
    "Total Monthly Wages",
    "Reason Code",
    "Last Working Day",
];

/// Rendered report ready to hand to the transport: raw bytes plus the
/// suggested filename and MIME type.
pub struct ReportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RenderError {
    NoEligibleRows,
    Render(String),
}

fn eligible<'a>(
    data: &'a Dataset,
    company_id: u32,
    payroll_month_id: u32,
    filter: impl Fn(&PayrollEntry, &Employee) -> bool,
) -> Vec<(&'a PayrollEntry, &'a Employee)> {
    let mut rows: Vec<(&PayrollEntry, &Employee)> = data
        .month_entries(company_id, payroll_month_id)
        .filter_map(|entry| data.employee(entry.employee_id).map(|e| (entry, e)))
        .filter(|(entry, employee)| employee.is_active && filter(entry, employee))
        .collect();
    rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
    rows
}

/// ECR challan text: one delimited line per eligible entry plus a trailing
/// TOTAL line. Leaving employees and zero-attendance entries are excluded up
/// front, so the per-line reason code is always 0.
pub fn render_ecr(
    data: &Dataset,
    company_id: u32,
    payroll_month_id: u32,
) -> Result<ReportFile, RenderError> {
    let rows = eligible(data, company_id, payroll_month_id, |entry, employee| {
        !employee.pf_number.trim().is_empty()
            && employee.leaving_date.is_none()
            && entry.working_days > rust_decimal::Decimal::ZERO
    });
    if rows.is_empty() {
        return Err(RenderError::NoEligibleRows);
    }

    let mut out = String::new();
    out.push_str(ECR_HEADER);
    out.push('\n');

    let mut total_ee = rust_decimal::Decimal::ZERO;
    let mut total_eps = rust_decimal::Decimal::ZERO;
    let mut total_er = rust_decimal::Decimal::ZERO;

    for (entry, employee) in rows {
        let figures = ecr_figures(entry.basic_da);
        let fields = [
            employee.pf_number.clone(),
            employee.name.clone(),
            entry.gross_salary.to_string(),
            figures.epf_wages.to_string(),
            figures.eps_wages.to_string(),
            figures.edli_wages.to_string(),
            figures.ee_share.to_string(),
            figures.eps_contribution.to_string(),
            figures.er_share.to_string(),
            round_rupees(entry.ncp).to_string(),
            "0".to_string(),
            figures.refund.to_string(),
        ];
        out.push_str(&fields.join(ECR_DELIMITER));
        out.push('\n');

        total_ee += figures.ee_share;
        total_eps += figures.eps_contribution;
        total_er += figures.er_share;
    }

    let totals = [
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        total_ee.to_string(),
        total_eps.to_string(),
        total_er.to_string(),
        String::new(),
        String::new(),
        String::new(),
    ];
    out.push_str(&totals.join(ECR_DELIMITER));
    out.push('\n');

    Ok(ReportFile {
        filename: format!("ECR_Challan_{}.txt", Local::now().format("%Y%m%d_%H%M%S")),
        content_type: "text/plain",
        bytes: out.into_bytes(),
    })
}

/// ESI return, six fixed columns as CSV. Zero-attendance entries only appear
/// when the employee has left with a proper reason code.
pub fn render_esi(
    data: &Dataset,
    company_id: u32,
    payroll_month_id: u32,
    month: &PayrollMonth,
) -> Result<ReportFile, RenderError> {
    let zero = rust_decimal::Decimal::ZERO;
    let rows = eligible(data, company_id, payroll_month_id, |entry, employee| {
        !employee.esi_number.trim().is_empty()
            && (entry.working_days > zero
                || (entry.working_days == zero
                    && employee.leaving_date.is_some()
                    && entry.reason != 0))
    });
    if rows.is_empty() {
        return Err(RenderError::NoEligibleRows);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(ESI_HEADER)
        .map_err(|e| RenderError::Render(e.to_string()))?;

    for (entry, employee) in rows {
        let reason_code =
            if entry.working_days == zero || employee.leaving_date.is_some() {
                entry.reason
            } else {
                0
            };
        let last_working_day = employee
            .leaving_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        writer
            .write_record([
                employee.esi_number.as_str(),
                employee.name.as_str(),
                &entry.working_days.to_string(),
                &esi_wages(entry.gross_salary).to_string(),
                &reason_code.to_string(),
                &last_working_day,
            ])
            .map_err(|e| RenderError::Render(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RenderError::Render(e.to_string()))?;

    Ok(ReportFile {
        filename: format!(
            "ESI_Report_{}_{}.csv",
            month.month.replace(' ', "_"),
            Local::now().format("%Y%m%d_%H%M%S")
        ),
        content_type: "text/csv",
        bytes,
    })
}

/// Download gate on top of the employee-master gate: an active employee with
/// zero working days and no leaving date needs a real reason code before the
/// statutory files can go out.
pub fn entries_missing_reason(data: &Dataset, company_id: u32, payroll_month_id: u32) -> bool {
    let zero = rust_decimal::Decimal::ZERO;
    data.month_entries(company_id, payroll_month_id).any(|entry| {
        entry.working_days == zero
            && entry.reason == 0
            && data
                .employee(entry.employee_id)
                .is_some_and(|e| e.leaving_date.is_none())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Company;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
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
        let id = data.next_id();
        let month = PayrollMonth {
            id,
            company_id,
            month: "August 2025".into(),
            total_days: 30,
        };
        data.payroll_months.push(month.clone());
        (data, month)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_row(
        data: &mut Dataset,
        month_id: u32,
        name: &str,
        pf: &str,
        esi: &str,
        leaving: Option<NaiveDate>,
        working_days: Decimal,
        basic: Decimal,
        gross: Decimal,
        reason: i32,
    ) {
        let employee_id = data.next_id();
        data.employees.push(Employee {
            id: employee_id,
            company_id: 1,
            name: name.into(),
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            leaving_date: leaving,
            pf_number: pf.into(),
            esi_number: esi.into(),
            is_active: true,
            error: None,
        });
        let id = data.next_id();
        data.payroll_entries.push(PayrollEntry {
            id,
            employee_id,
            company_id: 1,
            payroll_month_id: month_id,
            working_days,
            basic_da: basic,
            gross_salary: gross,
            ncp: (Decimal::from(30) - working_days).max(Decimal::ZERO),
            reason,
        });
    }

    fn text(file: &ReportFile) -> String {
        String::from_utf8(file.bytes.clone()).unwrap()
    }

    #[test]
    fn ecr_line_and_totals() {
        let (mut data, month) = setup();
        add_row(
            &mut data, month.id, "A", "PF1", "E1", None, dec!(22), dec!(20000), dec!(25000), 0,
        );
        let file = render_ecr(&data, 1, month.id).unwrap();
        let content = text(&file);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("UAN#~#Employee Name"));
        assert_eq!(
            lines[1],
            "PF1#~#A#~#25000#~#20000#~#15000#~#15000#~#2400#~#1250#~#1150#~#8#~#0#~#0"
        );
        assert_eq!(lines[2], "TOTAL#~##~##~##~##~##~#2400#~#1250#~#1150#~##~##~#");
        assert_eq!(file.content_type, "text/plain");
        assert!(file.filename.starts_with("ECR_Challan_"));
    }

    #[test]
    fn ecr_excludes_leavers_zero_days_and_blank_pf() {
        let (mut data, month) = setup();
        add_row(
            &mut data, month.id, "Ok", "PF1", "E1", None, dec!(20), dec!(10000), dec!(12000), 0,
        );
        add_row(
            &mut data,
            month.id,
            "Left",
            "PF2",
            "E2",
            NaiveDate::from_ymd_opt(2025, 6, 30),
            dec!(20),
            dec!(10000),
            dec!(12000),
            2,
        );
        add_row(
            &mut data, month.id, "Absent", "PF3", "E3", None, dec!(0), dec!(0), dec!(0), 0,
        );
        add_row(
            &mut data, month.id, "NoPf", "", "E4", None, dec!(20), dec!(10000), dec!(12000), 0,
        );
        let file = render_ecr(&data, 1, month.id).unwrap();
        let content = text(&file);
        assert_eq!(content.lines().count(), 3); // header + Ok + TOTAL
        assert!(content.contains("#~#Ok#~#"));
    }

    #[test]
    fn ecr_with_no_eligible_rows_is_an_error() {
        let (data, month) = setup();
        assert!(matches!(
            render_ecr(&data, 1, month.id),
            Err(RenderError::NoEligibleRows)
        ));
    }

    #[test]
    fn esi_caps_wages_and_formats_leaving_date() {
        let (mut data, month) = setup();
        add_row(
            &mut data, month.id, "A", "PF1", "E1", None, dec!(22), dec!(20000), dec!(25000), 0,
        );
        add_row(
            &mut data,
            month.id,
            "Gone",
            "PF2",
            "E2",
            NaiveDate::from_ymd_opt(2025, 6, 30),
            dec!(0),
            dec!(0),
            dec!(5000),
            2,
        );
        let file = render_esi(&data, 1, month.id, &month).unwrap();
        let content = text(&file);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "IP Number,IP Name,Days,Total Monthly Wages,Reason Code,Last Working Day"
        );
        assert_eq!(lines[1], "E1,A,22,21000,0,");
        assert_eq!(lines[2], "E2,Gone,0,5000,2,30/06/2025");
        assert_eq!(file.content_type, "text/csv");
    }

    #[test]
    fn esi_drops_zero_day_rows_without_reason_or_leaving_date() {
        let (mut data, month) = setup();
        add_row(
            &mut data, month.id, "Absent", "PF1", "E1", None, dec!(0), dec!(0), dec!(0), 0,
        );
        assert!(matches!(
            render_esi(&data, 1, month.id, &month),
            Err(RenderError::NoEligibleRows)
        ));
    }

    #[test]
    fn missing_reason_blocks_download() {
        let (mut data, month) = setup();
        add_row(
            &mut data, month.id, "Absent", "PF1", "E1", None, dec!(0), dec!(0), dec!(0), 0,
        );
        assert!(entries_missing_reason(&data, 1, month.id));
        // A proper reason code clears the gate.
        let id = data.payroll_entries[0].id;
        data.payroll_entry_mut(id).unwrap().reason = 3;
        assert!(!entries_missing_reason(&data, 1, month.id));
    }
}
