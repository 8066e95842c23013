use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollMonth {
    #[schema(example = 7)]
    pub id: u32,

    #[schema(example = 1)]
    pub company_id: u32,

    /// Free-text label, e.g. "August 2025".
    #[schema(example = "August 2025")]
    pub month: String,

    /// NCP baseline. An independent input field, not derived from the label.
    #[schema(example = 30)]
    pub total_days: u32,
}

pub const DEFAULT_TOTAL_DAYS: u32 = 30;
