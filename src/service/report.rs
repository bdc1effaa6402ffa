use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::checkin::CheckinStatus;
use crate::utils::time::{serialize_utc, serialize_utc_opt, utc_now};

/// One visit on the reported day, joined with employee and client names.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct DailyVisit {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    pub client_id: i64,
    #[schema(example = "Acme Warehouse")]
    pub client_name: String,
    pub status: CheckinStatus,
    #[serde(serialize_with = "serialize_utc")]
    #[schema(example = "2026-01-15T09:15:00Z", value_type = String, format = "date-time")]
    pub checkin_time: NaiveDateTime,
    #[serde(serialize_with = "serialize_utc_opt")]
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkout_time: Option<NaiveDateTime>,
    /// Whole minutes on site; null while the visit is still open.
    #[schema(example = 95, nullable = true)]
    pub duration_minutes: Option<i64>,
}

/// Per-day aggregates. A day with zero records yields zero-valued aggregates
/// and an empty visit list, never a missing field.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyReport {
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub total_checkins: i64,
    pub completed: i64,
    pub still_open: i64,
    pub total_minutes: i64,
    pub average_minutes: i64,
    pub visits: Vec<DailyVisit>,
}

pub async fn daily_report(pool: &SqlitePool, date: NaiveDate) -> Result<DailyReport, ApiError> {
    if date > utc_now().date() {
        return Err(ApiError::InvalidInput("report date is in the future".into()));
    }

    let (total_checkins, completed, total_minutes): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status = 'closed' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(
                CASE WHEN checkout_time IS NOT NULL
                    THEN CAST((julianday(checkout_time) - julianday(checkin_time)) * 1440 AS INTEGER)
                    ELSE 0
                END), 0)
        FROM checkins
        WHERE date(checkin_time) = date(?)
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    let visits = sqlx::query_as::<_, DailyVisit>(
        r#"
        SELECT
            c.id,
            c.employee_id,
            TRIM(e.first_name || ' ' || COALESCE(e.last_name, '')) AS employee_name,
            c.client_id,
            cl.name AS client_name,
            c.status,
            c.checkin_time,
            c.checkout_time,
            CASE WHEN c.checkout_time IS NOT NULL
                THEN CAST((julianday(c.checkout_time) - julianday(c.checkin_time)) * 1440 AS INTEGER)
                ELSE NULL
            END AS duration_minutes
        FROM checkins c
        JOIN employees e ON e.id = c.employee_id
        JOIN clients cl ON cl.id = c.client_id
        WHERE date(c.checkin_time) = date(?)
        ORDER BY c.checkin_time DESC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let average_minutes = if completed > 0 { total_minutes / completed } else { 0 };

    Ok(DailyReport {
        date,
        total_checkins,
        completed,
        still_open: total_checkins - completed,
        total_minutes,
        average_minutes,
        visits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::service::checkin::{NewCheckin, complete_checkout, start_checkin};
    use chrono::Duration;

    #[actix_web::test]
    async fn empty_day_yields_zero_aggregates_not_missing_fields() {
        let pool = test_pool().await;

        let report = daily_report(&pool, utc_now().date()).await.unwrap();
        assert_eq!(report.total_checkins, 0);
        assert_eq!(report.completed, 0);
        assert_eq!(report.still_open, 0);
        assert_eq!(report.total_minutes, 0);
        assert_eq!(report.average_minutes, 0);
        assert!(report.visits.is_empty());

        // The serialized shape keeps every aggregate present.
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_checkins"], 0);
        assert_eq!(json["visits"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn completed_visits_are_counted_and_joined() {
        let pool = test_pool().await;
        let emp = sqlx::query(
            "INSERT INTO employees (employee_code, first_name, last_name, email) VALUES ('FLD-001', 'Jane', 'Doe', 'jane@acme.test')",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        let client = sqlx::query(
            "INSERT INTO clients (name, latitude, longitude) VALUES ('Acme Warehouse', 23.7804, 90.4053)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let new = NewCheckin {
            client_id: client,
            latitude: 23.7801,
            longitude: 90.4049,
            distance_from_client: None,
            notes: None,
        };
        start_checkin(&pool, emp, new).await.unwrap();
        complete_checkout(&pool, emp).await.unwrap();

        let report = daily_report(&pool, utc_now().date()).await.unwrap();
        assert_eq!(report.total_checkins, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(report.still_open, 0);
        assert_eq!(report.visits.len(), 1);
        assert_eq!(report.visits[0].employee_name, "Jane Doe");
        assert_eq!(report.visits[0].client_name, "Acme Warehouse");
        assert!(report.visits[0].duration_minutes.is_some());
    }

    #[actix_web::test]
    async fn future_report_date_is_invalid() {
        let pool = test_pool().await;
        pool.close().await;

        let tomorrow = (utc_now() + Duration::days(1)).date();
        let err = daily_report(&pool, tomorrow).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
