pub mod auth;
pub mod company;
pub mod employee;
pub mod organization;
pub mod payroll;
pub mod payroll_upload;
pub mod seed;
pub mod user;
