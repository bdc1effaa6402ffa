use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub async fn init_db(database_url: &str) -> SqlitePool {
    // Referential integrity is part of the input-validation story, so the
    // pragma is set explicitly rather than left to driver defaults.
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to connect to database")
}

/// Embedded schema migrations, applied in order at startup. Every statement
/// is idempotent so re-running on an existing database is a no-op.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create_employees",
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_code TEXT UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            hire_date DATE
        );
        "#,
    ),
    (
        "create_users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role_id INTEGER NOT NULL DEFAULT 3,
            employee_id INTEGER REFERENCES employees(id),
            last_login_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    ),
    (
        "create_clients",
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    ),
    (
        // The partial unique index is the backstop for the single-open-checkin
        // invariant: a second `status = 'open'` row for the same employee
        // fails at the storage layer no matter how requests interleave.
        "create_checkins",
        r#"
        CREATE TABLE IF NOT EXISTS checkins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            client_id INTEGER NOT NULL REFERENCES clients(id),
            status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'closed')),
            checkin_time TIMESTAMP NOT NULL,
            checkout_time TIMESTAMP,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            distance_from_client REAL,
            notes TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_checkins_open_employee
            ON checkins(employee_id) WHERE status = 'open';
        CREATE INDEX IF NOT EXISTS idx_checkins_employee_time
            ON checkins(employee_id, checkin_time);
        "#,
    ),
    (
        "create_refresh_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS refresh_tokens (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            jti TEXT NOT NULL UNIQUE,
            expires_at TIMESTAMP NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, sql) in MIGRATIONS {
        sqlx::query(sql).execute(pool).await?;
        tracing::debug!(migration = name, "migration applied");
    }
    Ok(())
}

/// In-memory pool for tests. A single connection keeps every test statement
/// on the same in-memory database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid test database URL")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}
