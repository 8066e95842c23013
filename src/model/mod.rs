pub mod company;
pub mod employee;
pub mod organization;
pub mod payroll_entry;
pub mod payroll_month;
pub mod user;

pub use company::Company;
pub use employee::Employee;
pub use organization::Organization;
pub use payroll_entry::PayrollEntry;
pub use payroll_month::PayrollMonth;
pub use user::{User, UserRole};
