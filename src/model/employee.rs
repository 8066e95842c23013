use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The ESI number value that marks the field as intentionally absent.
/// Compared case-insensitively after trimming.
pub const ESI_NIL: &str = "NIL";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "company_id": 1,
        "name": "John Doe",
        "joining_date": "2024-01-01",
        "leaving_date": null,
        "pf_number": "100923456789",
        "esi_number": "1012345678",
        "is_active": true,
        "error": null
    })
)]
pub struct Employee {
    #[schema(example = 42)]
    pub id: u32,

    #[schema(example = 1)]
    pub company_id: u32,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub joining_date: NaiveDate,

    #[schema(example = "2025-06-30", value_type = Option<String>, format = "date", nullable = true)]
    pub leaving_date: Option<NaiveDate>,

    /// UAN. May be empty when the company does not run PF.
    #[schema(example = "100923456789")]
    pub pf_number: String,

    /// IP number, or the literal "NIL" when intentionally absent.
    #[schema(example = "1012345678")]
    pub esi_number: String,

    #[schema(example = true)]
    pub is_active: bool,

    /// First validation failure for this row, recomputed over the whole
    /// company whenever any sibling row changes. `None` means valid.
    #[schema(example = "Duplicate PF Number in database.", nullable = true)]
    pub error: Option<String>,
}

/// True when the ESI field carries the NIL sentinel rather than a number.
pub fn esi_is_nil(esi_number: &str) -> bool {
    let trimmed = esi_number.trim();
    !trimmed.is_empty() && trimmed.eq_ignore_ascii_case(ESI_NIL)
}
