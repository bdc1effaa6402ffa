use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::client::ClientSite;
use crate::service::checkin::{self, NewCheckin};
use crate::utils::geo;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckinRequest {
    #[schema(example = 3)]
    pub client_id: i64,

    #[schema(example = 23.7801)]
    pub latitude: f64,

    #[schema(example = 90.4049)]
    pub longitude: f64,

    /// Meters from the client site. Computed server-side from the site's
    /// stored coordinates when absent.
    #[schema(example = 34.7, nullable = true)]
    pub distance_from_client: Option<f64>,

    #[schema(example = "gate B", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Inclusive lower bound; required together with end_date
    #[param(example = "2026-01-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound; required together with start_date
    #[param(example = "2026-01-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/checkin",
    request_body = CheckinRequest,
    responses(
        (status = 201, description = "Checked in", body = crate::model::checkin::Checkin),
        (status = 400, description = "Invalid input", body = Object, example = json!({
            "error": "unknown client"
        })),
        (status = 409, description = "Already checked in", body = Object, example = json!({
            "error": "Already checked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Checkin"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CheckinRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let payload = payload.into_inner();

    // The site must exist before a distance can be audited against it.
    let site = sqlx::query_as::<_, ClientSite>("SELECT * FROM clients WHERE id = ?")
        .bind(payload.client_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::InvalidInput("unknown client".into()))?;

    let distance = payload.distance_from_client.unwrap_or_else(|| {
        geo::haversine_m(payload.latitude, payload.longitude, site.latitude, site.longitude)
    });

    let record = checkin::start_checkin(
        pool.get_ref(),
        employee_id,
        NewCheckin {
            client_id: payload.client_id,
            latitude: payload.latitude,
            longitude: payload.longitude,
            distance_from_client: Some(distance),
            notes: payload.notes,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/checkin/checkout",
    responses(
        (status = 200, description = "Checked out", body = crate::model::checkin::Checkin),
        (status = 409, description = "No active check-in", body = Object, example = json!({
            "error": "No active check-in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Checkin"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let record = checkin::complete_checkout(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Current open check-in. Absence is a normal state, never a 404.
#[utoipa::path(
    get,
    path = "/api/v1/checkin/active",
    responses(
        (status = 200, description = "Open record or explicit null", body = Object, example = json!({
            "data": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Checkin"
)]
pub async fn active(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let record = checkin::active_checkin(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "data": record })))
}

/// Check-in history, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/checkin/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History records", body = Object),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Checkin"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let records =
        checkin::list_history(pool.get_ref(), employee_id, query.start_date, query.end_date)
            .await?;

    let total = records.len();
    Ok(HttpResponse::Ok().json(json!({ "data": records, "total": total })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt, middleware::auth_middleware};
    use crate::config::Config;
    use crate::db::test_pool;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, test};

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 900,
            refresh_token_ttl: 604800,
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api/v1".into(),
        }
    }

    async fn seed(pool: &SqlitePool) {
        sqlx::query(
            "INSERT INTO employees (employee_code, first_name, last_name, email) VALUES ('FLD-001', 'Jane', 'Doe', 'jane@acme.test')",
        )
        .execute(pool)
        .await
        .expect("seed employee");
        sqlx::query(
            "INSERT INTO clients (name, latitude, longitude) VALUES ('Acme Warehouse', 23.7804, 90.4053)",
        )
        .execute(pool)
        .await
        .expect("seed client");
    }

    #[actix_web::test]
    async fn status_codes_follow_the_contract() {
        let pool = test_pool().await;
        seed(&pool).await;
        let config = test_config();
        let token =
            jwt::generate_access_token(1, "jane".into(), 3, Some(1), &config.jwt_secret, 900);
        let bearer = format!("Bearer {token}");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(config.clone()))
                .service(
                    web::scope("/api/v1").wrap(from_fn(auth_middleware)).service(
                        web::scope("/checkin")
                            .service(web::resource("").route(web::post().to(check_in)))
                            .service(web::resource("/checkout").route(web::put().to(check_out)))
                            .service(web::resource("/active").route(web::get().to(active)))
                            .service(web::resource("/history").route(web::get().to(history))),
                    ),
                ),
        )
        .await;

        let body = json!({ "client_id": 1, "latitude": 23.7801, "longitude": 90.4049 });

        // Missing identity -> 401
        let req = test::TestRequest::post()
            .uri("/api/v1/checkin")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // First check-in -> 201, server computes the distance
        let req = test::TestRequest::post()
            .uri("/api/v1/checkin")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["status"], "open");
        assert!(created["distance_from_client"].as_f64().unwrap() > 0.0);

        // Duplicate -> 409
        let req = test::TestRequest::post()
            .uri("/api/v1/checkin")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Unknown client -> 400
        let req = test::TestRequest::post()
            .uri("/api/v1/checkin")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "client_id": 999, "latitude": 0.0, "longitude": 0.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Active -> 200 with the open record
        let req = test::TestRequest::get()
            .uri("/api/v1/checkin/active")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let active_body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(active_body["data"]["status"], "open");

        // Inverted history range -> 400
        let req = test::TestRequest::get()
            .uri("/api/v1/checkin/history?start_date=2026-01-20&end_date=2026-01-10")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Checkout -> 200 with the closed record, UTC marker on timestamps
        let req = test::TestRequest::put()
            .uri("/api/v1/checkin/checkout")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let closed: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(closed["status"], "closed");
        assert!(closed["checkout_time"].as_str().unwrap().ends_with('Z'));

        // Second checkout -> 409
        let req = test::TestRequest::put()
            .uri("/api/v1/checkin/checkout")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Active again -> explicit null, not 404
        let req = test::TestRequest::get()
            .uri("/api/v1/checkin/active")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let active_body: serde_json::Value = test::read_body_json(resp).await;
        assert!(active_body["data"].is_null());
    }
}
