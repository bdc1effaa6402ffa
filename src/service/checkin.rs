use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::checkin::Checkin;
use crate::utils::time::utc_now;

/// Input for a new check-in. `client_id` and the coordinates are validated;
/// distance and notes are stored verbatim.
#[derive(Debug, Clone)]
pub struct NewCheckin {
    pub client_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_from_client: Option<f64>,
    pub notes: Option<String>,
}

fn validate_coords(lat: f64, lon: f64) -> Result<(), ApiError> {
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(ApiError::InvalidInput(
            "latitude/longitude out of range".into(),
        ));
    }
    Ok(())
}

/// Open a check-in for the employee, iff they hold no open record.
///
/// The pre-emptive check answers the common case; the partial unique index on
/// `checkins(employee_id) WHERE status = 'open'` is what makes the
/// check-then-insert safe when two requests for the same employee race. Both
/// detection paths surface the same `AlreadyCheckedIn`.
pub async fn start_checkin(
    pool: &SqlitePool,
    employee_id: i64,
    new: NewCheckin,
) -> Result<Checkin, ApiError> {
    if new.client_id <= 0 {
        return Err(ApiError::InvalidInput("client_id is required".into()));
    }
    validate_coords(new.latitude, new.longitude)?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM checkins WHERE employee_id = ? AND status = 'open'")
            .bind(employee_id)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(ApiError::AlreadyCheckedIn);
    }

    let now = utc_now();
    let result = sqlx::query(
        r#"
        INSERT INTO checkins
            (employee_id, client_id, status, checkin_time, latitude, longitude, distance_from_client, notes)
        VALUES (?, ?, 'open', ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(new.client_id)
    .bind(now)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(new.distance_from_client)
    .bind(&new.notes)
    .execute(pool)
    .await;

    let created_id = match result {
        Ok(res) => res.last_insert_rowid(),
        // Lost the race to a concurrent check-in for the same employee.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::AlreadyCheckedIn);
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            return Err(ApiError::InvalidInput(
                "unknown client or employee reference".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let created = sqlx::query_as::<_, Checkin>("SELECT * FROM checkins WHERE id = ?")
        .bind(created_id)
        .fetch_one(pool)
        .await?;

    Ok(created)
}

/// Close the employee's open check-in.
///
/// A single predicated UPDATE; the affected-row-count is the correctness
/// signal, so a concurrent duplicate checkout matches zero rows instead of
/// corrupting state.
pub async fn complete_checkout(pool: &SqlitePool, employee_id: i64) -> Result<Checkin, ApiError> {
    let now = utc_now();

    let result = sqlx::query(
        r#"
        UPDATE checkins
        SET status = 'closed', checkout_time = ?
        WHERE employee_id = ? AND status = 'open'
        "#,
    )
    .bind(now)
    .bind(employee_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Already closed or never opened; not fatal.
        return Err(ApiError::NoActiveCheckin);
    }

    let closed = sqlx::query_as::<_, Checkin>(
        "SELECT * FROM checkins WHERE employee_id = ? AND checkout_time = ?",
    )
    .bind(employee_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(closed)
}

/// The employee's open record, if any. Absence is ordinary, not an error.
pub async fn active_checkin(
    pool: &SqlitePool,
    employee_id: i64,
) -> Result<Option<Checkin>, ApiError> {
    let record = sqlx::query_as::<_, Checkin>(
        "SELECT * FROM checkins WHERE employee_id = ? AND status = 'open'",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Check-in history, most recent first. Date bounds are optional but must be
/// given together; an inverted or future-dated range fails before any store
/// access.
pub async fn list_history(
    pool: &SqlitePool,
    employee_id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<Checkin>, ApiError> {
    let range = match (start_date, end_date) {
        (None, None) => None,
        (Some(start), Some(end)) => {
            if end < start {
                return Err(ApiError::InvalidInput(
                    "end_date cannot precede start_date".into(),
                ));
            }
            let today = utc_now().date();
            if start > today || end > today {
                return Err(ApiError::InvalidInput("date range is in the future".into()));
            }
            Some((start, end))
        }
        _ => {
            return Err(ApiError::InvalidInput(
                "start_date and end_date must be given together".into(),
            ));
        }
    };

    let records = match range {
        Some((start, end)) => {
            sqlx::query_as::<_, Checkin>(
                r#"
                SELECT * FROM checkins
                WHERE employee_id = ? AND date(checkin_time) BETWEEN date(?) AND date(?)
                ORDER BY checkin_time DESC
                "#,
            )
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Checkin>(
                "SELECT * FROM checkins WHERE employee_id = ? ORDER BY checkin_time DESC",
            )
            .bind(employee_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::model::checkin::CheckinStatus;
    use chrono::Duration;

    async fn seed_employee(pool: &SqlitePool, code: &str, email: &str) -> i64 {
        sqlx::query(
            "INSERT INTO employees (employee_code, first_name, last_name, email) VALUES (?, 'Jane', 'Doe', ?)",
        )
        .bind(code)
        .bind(email)
        .execute(pool)
        .await
        .expect("seed employee")
        .last_insert_rowid()
    }

    async fn seed_client(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO clients (name, address, latitude, longitude) VALUES ('Acme Warehouse', '12 Dock Road', 23.7804, 90.4053)",
        )
        .execute(pool)
        .await
        .expect("seed client")
        .last_insert_rowid()
    }

    fn new_checkin(client_id: i64) -> NewCheckin {
        NewCheckin {
            client_id,
            latitude: 23.7801,
            longitude: 90.4049,
            distance_from_client: Some(35.0),
            notes: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[actix_web::test]
    async fn round_trip_start_checkout_active() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        let opened = start_checkin(&pool, emp, new_checkin(client)).await.unwrap();
        assert_eq!(opened.status, CheckinStatus::Open);
        assert_eq!(opened.checkout_time, None);

        let closed = complete_checkout(&pool, emp).await.unwrap();
        assert_eq!(closed.id, opened.id);
        assert_eq!(closed.status, CheckinStatus::Closed);
        assert!(closed.checkout_time.unwrap() > closed.checkin_time);

        assert!(active_checkin(&pool, emp).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn second_checkin_conflicts_via_the_pre_check() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        start_checkin(&pool, emp, new_checkin(client)).await.unwrap();
        let err = start_checkin(&pool, emp, new_checkin(client)).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyCheckedIn));
    }

    #[actix_web::test]
    async fn concurrent_checkins_leave_exactly_one_open_row() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        let attempts = futures::future::join_all(
            (0..4).map(|_| start_checkin(&pool, emp, new_checkin(client))),
        )
        .await;

        let successes = attempts.iter().filter(|r| r.is_ok()).count();
        let conflicts = attempts
            .iter()
            .filter(|r| matches!(r, Err(ApiError::AlreadyCheckedIn)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 3);

        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM checkins WHERE employee_id = ? AND status = 'open'",
        )
        .bind(emp)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(open, 1);
    }

    #[actix_web::test]
    async fn concurrent_checkouts_close_exactly_once() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;
        start_checkin(&pool, emp, new_checkin(client)).await.unwrap();

        let attempts = futures::future::join_all(
            (0..2).map(|_| complete_checkout(&pool, emp)),
        )
        .await;

        let successes = attempts.iter().filter(|r| r.is_ok()).count();
        let misses = attempts
            .iter()
            .filter(|r| matches!(r, Err(ApiError::NoActiveCheckin)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(misses, 1);

        let (closed, with_checkout): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                SUM(CASE WHEN status = 'closed' THEN 1 ELSE 0 END),
                SUM(CASE WHEN checkout_time IS NOT NULL THEN 1 ELSE 0 END)
            FROM checkins WHERE employee_id = ?
            "#,
        )
        .bind(emp)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(closed, 1);
        assert_eq!(with_checkout, 1);
    }

    #[actix_web::test]
    async fn checkout_without_checkin_reports_no_active() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;

        let err = complete_checkout(&pool, emp).await.unwrap_err();
        assert!(matches!(err, ApiError::NoActiveCheckin));
    }

    #[actix_web::test]
    async fn checkin_after_checkout_creates_a_new_record() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        let first = start_checkin(&pool, emp, new_checkin(client)).await.unwrap();
        complete_checkout(&pool, emp).await.unwrap();
        let second = start_checkin(&pool, emp, new_checkin(client)).await.unwrap();

        assert_ne!(first.id, second.id);

        let history = list_history(&pool, emp, None, None).await.unwrap();
        assert_eq!(history.len(), 2);
        // Most recent first.
        assert_eq!(history[0].id, second.id);
        assert!(history[0].checkin_time >= history[1].checkin_time);
    }

    #[actix_web::test]
    async fn history_is_scoped_to_the_employee() {
        let pool = test_pool().await;
        let jane = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let omar = seed_employee(&pool, "FLD-002", "omar@acme.test").await;
        let client = seed_client(&pool).await;

        start_checkin(&pool, jane, new_checkin(client)).await.unwrap();
        start_checkin(&pool, omar, new_checkin(client)).await.unwrap();

        let history = list_history(&pool, jane, None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].employee_id, jane);
    }

    #[actix_web::test]
    async fn inverted_range_fails_before_the_store() {
        let pool = test_pool().await;
        // A closed pool would surface Storage if the query ever ran.
        pool.close().await;

        let err = list_history(&pool, 1, Some(date(2026, 1, 20)), Some(date(2026, 1, 10)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn future_range_fails_before_the_store() {
        let pool = test_pool().await;
        pool.close().await;

        let tomorrow = (utc_now() + Duration::days(1)).date();
        let err = list_history(&pool, 1, Some(tomorrow), Some(tomorrow))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn one_sided_range_is_invalid() {
        let pool = test_pool().await;

        let err = list_history(&pool, 1, Some(date(2026, 1, 10)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn bounded_range_filters_by_checkin_date() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        start_checkin(&pool, emp, new_checkin(client)).await.unwrap();
        complete_checkout(&pool, emp).await.unwrap();

        let today = utc_now().date();
        let hit = list_history(&pool, emp, Some(today), Some(today)).await.unwrap();
        assert_eq!(hit.len(), 1);

        let last_week = today - Duration::days(7);
        let miss = list_history(&pool, emp, Some(last_week), Some(last_week))
            .await
            .unwrap();
        assert!(miss.is_empty());
    }

    #[actix_web::test]
    async fn unknown_client_is_invalid_input() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;

        let err = start_checkin(&pool, emp, new_checkin(9999)).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn out_of_range_coordinates_are_rejected() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        let mut bad = new_checkin(client);
        bad.latitude = 123.0;
        let err = start_checkin(&pool, emp, bad).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let mut bad = new_checkin(client);
        bad.longitude = f64::NAN;
        let err = start_checkin(&pool, emp, bad).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn location_is_stored_verbatim() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "FLD-001", "jane@acme.test").await;
        let client = seed_client(&pool).await;

        let mut new = new_checkin(client);
        new.notes = Some("gate B".into());
        let created = start_checkin(&pool, emp, new).await.unwrap();

        assert_eq!(created.latitude, 23.7801);
        assert_eq!(created.longitude, 90.4049);
        assert_eq!(created.distance_from_client, Some(35.0));
        assert_eq!(created.notes.as_deref(), Some("gate B"));
    }
}
