//! SQLite-backed [`IngredientStore`].
//!
//! Each trait method issues exactly one statement against the
//! `ingredients` table; SQLite auto-commits it. Driver errors are reported
//! as [`PantryError::Persistence`].

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::debug;

use pantry_core::error::{PantryError, PantryResult};
use pantry_core::models::{Ingredient, IngredientFields};
use pantry_core::store::IngredientStore;

use crate::db;
use crate::migrate;

pub struct SqliteIngredientStore {
    pool: SqlitePool,
}

impl SqliteIngredientStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database file at `path`, creating it if missing.
    pub async fn open(path: &Path) -> PantryResult<Self> {
        let pool = db::connect(path)
            .await
            .map_err(PantryError::Persistence)?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Decode one row. A column of the wrong type is a persistence error.
fn row_to_ingredient(row: &SqliteRow) -> PantryResult<Ingredient> {
    Ok(Ingredient {
        id: row.try_get("id").map_err(PantryError::persistence)?,
        name: row.try_get("name").map_err(PantryError::persistence)?,
        quantity: row.try_get("quantity").map_err(PantryError::persistence)?,
        purchase_date: row
            .try_get("purchase_date")
            .map_err(PantryError::persistence)?,
        expiry_date: row
            .try_get("expiry_date")
            .map_err(PantryError::persistence)?,
    })
}

#[async_trait]
impl IngredientStore for SqliteIngredientStore {
    async fn initialize(&self) -> PantryResult<()> {
        migrate::run_migrations(&self.pool).await
    }

    async fn add(&self, fields: &IngredientFields) -> PantryResult<Ingredient> {
        let result = sqlx::query(
            "INSERT INTO ingredients (name, quantity, purchase_date, expiry_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&fields.name)
        .bind(&fields.quantity)
        .bind(&fields.purchase_date)
        .bind(&fields.expiry_date)
        .execute(&self.pool)
        .await
        .map_err(PantryError::persistence)?;

        let id = result.last_insert_rowid();
        debug!(id, name = %fields.name, "ingredient added");
        Ok(Ingredient::from_fields(id, fields.clone()))
    }

    async fn list_all(&self) -> PantryResult<Vec<Ingredient>> {
        let rows = sqlx::query(
            "SELECT id, name, quantity, purchase_date, expiry_date FROM ingredients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(PantryError::persistence)?;

        rows.iter().map(row_to_ingredient).collect()
    }

    async fn update(&self, id: i64, fields: &IngredientFields) -> PantryResult<()> {
        let result = sqlx::query(
            "UPDATE ingredients SET name = ?, quantity = ?, purchase_date = ?, expiry_date = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.quantity)
        .bind(&fields.purchase_date)
        .bind(&fields.expiry_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(PantryError::persistence)?;

        debug!(id, rows = result.rows_affected(), "ingredient updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> PantryResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(PantryError::persistence)?;

        debug!(id, rows = result.rows_affected(), "ingredient deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> SqliteIngredientStore {
        let store = SqliteIngredientStore::open(&tmp.path().join("data/inventory.sqlite"))
            .await
            .unwrap();
        store.initialize().await.unwrap();
        store
    }

    fn fields(name: &str, expiry: Option<&str>) -> IngredientFields {
        IngredientFields::new(name, Some("1".into()), None, expiry.map(String::from))
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_list_ordered_by_id() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        for (n, name) in ["tomato", "egg", "tofu"].iter().enumerate() {
            let row = store.add(&fields(name, None)).await.unwrap();
            assert_eq!(row.name, *name);
            assert_eq!(store.list_all().await.unwrap().len(), n + 1);
        }
        let rows = store.list_all().await.unwrap();
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(rows[0].name, "tomato");
    }

    #[tokio::test]
    async fn test_update_changes_only_target() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let a = store.add(&fields("tomato", Some("2024-01-20"))).await.unwrap();
        let b = store.add(&fields("egg", None)).await.unwrap();

        store
            .update(
                a.id,
                &IngredientFields::new(
                    "cherry tomato",
                    Some("500g".into()),
                    Some("2024-01-10".into()),
                    Some("2024-01-25".into()),
                ),
            )
            .await
            .unwrap();

        let rows = store.list_all().await.unwrap();
        let updated = rows.iter().find(|r| r.id == a.id).unwrap();
        assert_eq!(updated.name, "cherry tomato");
        assert_eq!(updated.quantity.as_deref(), Some("500g"));
        assert_eq!(updated.purchase_date.as_deref(), Some("2024-01-10"));
        assert_eq!(updated.expiry_date.as_deref(), Some("2024-01-25"));
        assert_eq!(rows.iter().find(|r| r.id == b.id).unwrap(), &b);
    }

    #[tokio::test]
    async fn test_missing_ids_are_noops() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.add(&fields("egg", None)).await.unwrap();
        store.update(999, &fields("ghost", None)).await.unwrap();
        store.delete(999).await.unwrap();
        let rows = store.list_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "egg");
    }

    #[tokio::test]
    async fn test_delete_and_no_id_reuse() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.add(&fields("egg", None)).await.unwrap();
        let last = store.add(&fields("milk", None)).await.unwrap();
        store.delete(last.id).await.unwrap();
        assert!(store
            .list_all()
            .await
            .unwrap()
            .iter()
            .all(|r| r.id != last.id));

        let next = store.add(&fields("rice", None)).await.unwrap();
        assert!(next.id > last.id);
    }

    #[tokio::test]
    async fn test_unvalidated_dates_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store
            .add(&fields("mystery jar", Some("someday")))
            .await
            .unwrap();
        let rows = store.list_all().await.unwrap();
        assert_eq!(rows[0].expiry_date.as_deref(), Some("someday"));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let result = SqliteIngredientStore::open(&blocker.join("inventory.sqlite")).await;
        assert!(matches!(result, Err(PantryError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_foreign_table_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let pool = db::connect(&tmp.path().join("foreign.sqlite")).await.unwrap();
        sqlx::query(
            "CREATE TABLE ingredients (id TEXT, name TEXT, quantity TEXT, purchase_date TEXT, expiry_date TEXT)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO ingredients VALUES ('abc', 'egg', NULL, NULL, NULL)")
            .execute(&pool)
            .await
            .unwrap();

        let store = SqliteIngredientStore::new(pool);
        store.initialize().await.unwrap();
        let result = store.list_all().await;
        assert!(matches!(result, Err(PantryError::Persistence(_))));
    }
}
