use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::time::serialize_utc;

/// A client site employees check in at. Opaque to the check-in lifecycle;
/// its coordinates only feed the audit distance computation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ClientSite {
    #[schema(example = 3)]
    pub id: i64,

    #[schema(example = "Acme Warehouse")]
    pub name: String,

    #[schema(example = "12 Dock Road", nullable = true)]
    pub address: Option<String>,

    #[schema(example = 23.7804)]
    pub latitude: f64,

    #[schema(example = 90.4053)]
    pub longitude: f64,

    #[serde(serialize_with = "serialize_utc")]
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}
