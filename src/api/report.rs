use crate::auth::auth::AuthUser;
use crate::service::report::daily_report;
use crate::utils::time::to_viewer_local;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DailyReportQuery {
    #[param(example = "2026-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Viewer's offset from UTC, for localized display times only; storage
    /// and aggregates stay UTC.
    #[param(example = 330)]
    pub utc_offset_minutes: Option<i32>,
}

/// Daily report: aggregates plus the day's visits
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily",
    params(DailyReportQuery),
    responses(
        (status = 200, description = "Daily report", body = crate::service::report::DailyReport),
        (status = 400, description = "Future-dated report"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager/Admin only"),
        (status = 500, description = "Storage unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn daily(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DailyReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let report = daily_report(pool.get_ref(), query.date).await?;

    let viewer_local = query.utc_offset_minutes.map(|offset| {
        report
            .visits
            .iter()
            .map(|v| {
                json!({
                    "id": v.id,
                    "checkin_local": to_viewer_local(v.checkin_time, offset)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    "checkout_local": v.checkout_time.map(|t| {
                        to_viewer_local(t, offset).format("%Y-%m-%d %H:%M").to_string()
                    }),
                })
            })
            .collect::<Vec<_>>()
    });

    Ok(HttpResponse::Ok().json(json!({
        "report": report,
        "viewer_local": viewer_local,
    })))
}
