use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::utils::time::{minutes_since, serialize_utc};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Employees with an open check-in right now, any day
    #[schema(example = 4)]
    pub active_now: i64,
    #[schema(example = 11)]
    pub completed_today: i64,
    #[schema(example = 15)]
    pub total_today: i64,
}

#[derive(sqlx::FromRow)]
struct OnSiteRow {
    id: i64,
    employee_id: i64,
    employee_name: String,
    client_id: i64,
    client_name: String,
    checkin_time: NaiveDateTime,
    distance_from_client: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct OnSiteEntry {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    pub client_id: i64,
    #[schema(example = "Acme Warehouse")]
    pub client_name: String,
    #[serde(serialize_with = "serialize_utc")]
    #[schema(example = "2026-01-15T09:15:00Z", value_type = String, format = "date-time")]
    pub checkin_time: NaiveDateTime,
    #[schema(example = 95)]
    pub minutes_on_site: i64,
    #[schema(example = 34.7, nullable = true)]
    pub distance_from_client: Option<f64>,
}

/// Today's headline numbers (UTC day boundaries)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Today's summary", body = DashboardSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let (active_now, completed_today, total_today): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM checkins WHERE status = 'open'),
            (SELECT COUNT(*) FROM checkins
             WHERE status = 'closed' AND date(checkin_time) = date('now')),
            (SELECT COUNT(*) FROM checkins WHERE date(checkin_time) = date('now'))
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(DashboardSummary {
        active_now,
        completed_today,
        total_today,
    }))
}

/// Who is on site right now
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/active",
    responses(
        (status = 200, description = "Currently open check-ins", body = [OnSiteEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn active_now(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let rows = sqlx::query_as::<_, OnSiteRow>(
        r#"
        SELECT
            c.id,
            c.employee_id,
            TRIM(e.first_name || ' ' || COALESCE(e.last_name, '')) AS employee_name,
            c.client_id,
            cl.name AS client_name,
            c.checkin_time,
            c.distance_from_client
        FROM checkins c
        JOIN employees e ON e.id = c.employee_id
        JOIN clients cl ON cl.id = c.client_id
        WHERE c.status = 'open'
        ORDER BY c.checkin_time
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    let entries: Vec<OnSiteEntry> = rows
        .into_iter()
        .map(|r| OnSiteEntry {
            id: r.id,
            employee_id: r.employee_id,
            employee_name: r.employee_name,
            client_id: r.client_id,
            client_name: r.client_name,
            minutes_on_site: minutes_since(r.checkin_time),
            checkin_time: r.checkin_time,
            distance_from_client: r.distance_from_client,
        })
        .collect();

    Ok(HttpResponse::Ok().json(entries))
}
