use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::time::{serialize_utc, serialize_utc_opt};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckinStatus {
    Open,
    Closed,
}

/// One check-in attempt. Created `open`, closed exactly once, never deleted
/// and never reopened; a later visit creates a new record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 7,
        "client_id": 3,
        "status": "open",
        "checkin_time": "2026-01-15T09:15:00Z",
        "checkout_time": null,
        "latitude": 23.7801,
        "longitude": 90.4049,
        "distance_from_client": 34.7,
        "notes": "gate B"
    })
)]
pub struct Checkin {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 7)]
    pub employee_id: i64,

    #[schema(example = 3)]
    pub client_id: i64,

    pub status: CheckinStatus,

    /// Stored without an offset marker, UTC by convention; serialized with an
    /// explicit `Z` so consumers cannot misread it as local time.
    #[serde(serialize_with = "serialize_utc")]
    #[schema(example = "2026-01-15T09:15:00Z", value_type = String, format = "date-time")]
    pub checkin_time: NaiveDateTime,

    #[serde(serialize_with = "serialize_utc_opt")]
    #[schema(example = "2026-01-15T17:30:00Z", value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkout_time: Option<NaiveDateTime>,

    #[schema(example = 23.7801)]
    pub latitude: f64,

    #[schema(example = 90.4049)]
    pub longitude: f64,

    /// Meters from the client site, audit/display only, never an input to
    /// any lifecycle decision.
    #[schema(example = 34.7, nullable = true)]
    pub distance_from_client: Option<f64>,

    #[schema(example = "gate B", nullable = true)]
    pub notes: Option<String>,
}
