//! Schema creation for the inventory database.
//!
//! `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted
//! highest row again. Databases created without it keep their table as-is.

use sqlx::SqlitePool;

use pantry_core::error::{PantryError, PantryResult};

pub async fn run_migrations(pool: &SqlitePool) -> PantryResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity TEXT,
            purchase_date TEXT,
            expiry_date TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(PantryError::persistence)?;

    Ok(())
}
