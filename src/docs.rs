use crate::api::auth::{LoginRequest, LoginResponse};
use crate::api::company::{CompanyQuery, CreateCompanyRequest};
use crate::api::employee::CreateEmployeeRequest;
use crate::api::organization::{CreateOrganizationRequest, UpdateOrganizationRequest};
use crate::api::payroll::CreatePayrollMonthRequest;
use crate::api::payroll_upload::{CreateEntryRequest, EntryResponse, UpdateEntryRequest};
use crate::api::user::{CreateUserRequest, UpdateUserRequest, UserQuery, UserResponse};
use crate::model::{Company, Employee, Organization, PayrollEntry, PayrollMonth, User, UserRole};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Administration API",
        version = "1.0.0",
        description = r#"
## Payroll Administration System

Backend for a multi-company payroll administration tool.

### Key Features
- **Organizations & Users** - account management with role-based pairing rules
- **Companies & Employees** - employee master with PF/ESI validation
- **Payroll Upload** - spreadsheet reconciliation against the employee master
- **Statutory Reports** - EPFO ECR challan text and ESI return downloads

### Response Format
JSON-based RESTful responses; report downloads return file attachments.
"#,
    ),
    paths(
        crate::api::auth::login,

        crate::api::organization::list_organizations,
        crate::api::organization::get_organization,
        crate::api::organization::create_organization,
        crate::api::organization::update_organization,
        crate::api::organization::delete_organization,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::company::list_companies,
        crate::api::company::get_company,
        crate::api::company::create_company,
        crate::api::company::update_company,
        crate::api::company::delete_company,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::fix_employees,
        crate::api::employee::upload_employees,
        crate::api::employee::employees_with_errors,
        crate::api::employee::delete_employee,
        crate::api::employee::delete_company_employees,

        crate::api::payroll::list_payroll_months,
        crate::api::payroll::list_company_payroll_months,
        crate::api::payroll::get_payroll_month,
        crate::api::payroll::create_payroll_month,
        crate::api::payroll::update_payroll_month,
        crate::api::payroll::delete_payroll_month,

        crate::api::payroll_upload::can_upload,
        crate::api::payroll_upload::upload_payroll,
        crate::api::payroll_upload::list_entries,
        crate::api::payroll_upload::add_entry,
        crate::api::payroll_upload::update_entry,
        crate::api::payroll_upload::delete_entry,
        crate::api::payroll_upload::can_download,
        crate::api::payroll_upload::download_pf,
        crate::api::payroll_upload::download_esi,

        crate::api::seed::create_admin,
        crate::api::seed::seed_all
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            Organization,
            CreateOrganizationRequest,
            UpdateOrganizationRequest,
            User,
            UserRole,
            UserQuery,
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            Company,
            CompanyQuery,
            CreateCompanyRequest,
            Employee,
            CreateEmployeeRequest,
            PayrollMonth,
            CreatePayrollMonthRequest,
            PayrollEntry,
            CreateEntryRequest,
            UpdateEntryRequest,
            EntryResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Organization", description = "Organization management APIs"),
        (name = "User", description = "User management APIs"),
        (name = "Company", description = "Company management APIs"),
        (name = "Employee", description = "Employee master APIs"),
        (name = "PayrollMonth", description = "Payroll month APIs"),
        (name = "Payroll", description = "Payroll upload and statutory report APIs"),
        (name = "Seed", description = "Bootstrap data APIs"),
    )
)]
pub struct ApiDoc;
