use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::client::ClientSite;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["name", "address", "latitude", "longitude"];

#[derive(Deserialize, ToSchema)]
pub struct CreateClient {
    #[schema(example = "Acme Warehouse")]
    pub name: String,

    #[schema(example = "12 Dock Road", nullable = true)]
    pub address: Option<String>,

    #[schema(example = 23.7804)]
    pub latitude: f64,

    #[schema(example = 90.4053)]
    pub longitude: f64,
}

/// Create client site
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client site created", body = ClientSite),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager/Admin only"),
        (status = 500, description = "Storage unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn create_client(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateClient>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name must not be empty".into()).into());
    }
    if payload.latitude.abs() > 90.0 || payload.longitude.abs() > 180.0 {
        return Err(ApiError::InvalidInput("latitude/longitude out of range".into()).into());
    }

    let created_id = sqlx::query(
        r#"INSERT INTO clients (name, address, latitude, longitude) VALUES (?, ?, ?, ?)"#,
    )
    .bind(name)
    .bind(&payload.address)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::from)?
    .last_insert_rowid();

    let created = sqlx::query_as::<_, ClientSite>("SELECT * FROM clients WHERE id = ?")
        .bind(created_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(created))
}

/// List client sites
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses(
        (status = 200, description = "All client sites", body = [ClientSite]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn list_clients(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let clients = sqlx::query_as::<_, ClientSite>("SELECT * FROM clients ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(clients))
}

/// Get client site by ID
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id", Path, description = "Client site ID")
    ),
    responses(
        (status = 200, description = "Client site found", body = ClientSite),
        (status = 404, description = "Client site not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn get_client(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let client_id = path.into_inner();

    let client = sqlx::query_as::<_, ClientSite>("SELECT * FROM clients WHERE id = ?")
        .bind(client_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    match client {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Client site not found"
        }))),
    }
}

/// Update client site
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id", Path, description = "Client site ID")
    ),
    responses(
        (status = 200, description = "Client site updated"),
        (status = 400, description = "Invalid patch"),
        (status = 404, description = "Client site not found"),
        (status = 403, description = "Manager/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn update_client(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let client_id = path.into_inner();

    let update = build_update_sql("clients", UPDATABLE_COLUMNS, &body, "id", client_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ApiError::from)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Client site not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Client site updated"
    })))
}
