use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's attendance and wage figures for one payroll month.
/// Exactly one entry exists per (employee, month) after a successful upload;
/// uploads replace the whole (company, month) set wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollEntry {
    #[schema(example = 101)]
    pub id: u32,

    #[schema(example = 42)]
    pub employee_id: u32,

    /// Denormalized copy of the employee's company at upload time.
    #[schema(example = 1)]
    pub company_id: u32,

    #[schema(example = 7)]
    pub payroll_month_id: u32,

    /// Supports half-days.
    #[schema(value_type = f64, example = 22.5)]
    pub working_days: Decimal,

    #[schema(value_type = f64, example = 18000.0)]
    pub basic_da: Decimal,

    #[schema(value_type = f64, example = 25000.0)]
    pub gross_salary: Decimal,

    /// Non-contributing period: max(0, total_days - working_days).
    #[schema(value_type = f64, example = 7.5)]
    pub ncp: Decimal,

    /// 0 = no reason needed / active with full attendance.
    #[schema(example = 0)]
    pub reason: i32,
}
