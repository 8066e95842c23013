use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A payroll-bearing company. The two statutory flags decide which identifier
/// fields are mandatory on its employee rows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Creative Groups Pvt Ltd",
        "pf_enabled": true,
        "esi_enabled": true,
        "organization_id": 1
    })
)]
pub struct Company {
    #[schema(example = 1)]
    pub id: u32,

    #[schema(example = "Creative Groups Pvt Ltd")]
    pub name: String,

    #[schema(example = true)]
    pub pf_enabled: bool,

    #[schema(example = true)]
    pub esi_enabled: bool,

    /// `None` means the company is admin-managed / not yet assigned.
    #[schema(example = 1, nullable = true)]
    pub organization_id: Option<u32>,
}
