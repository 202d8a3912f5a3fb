//! Ingredient storage abstraction.
//!
//! The [`IngredientStore`] trait is what the presentation layer and the
//! advisor see. Every method is its own atomic unit; no transaction spans
//! two calls.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`initialize`](IngredientStore::initialize) | Ensure the backing table exists (idempotent) |
//! | [`add`](IngredientStore::add) | Insert a row, returning it with its new id |
//! | [`list_all`](IngredientStore::list_all) | All rows, ascending by id |
//! | [`update`](IngredientStore::update) | Overwrite the mutable fields of one row |
//! | [`delete`](IngredientStore::delete) | Remove one row |

pub mod memory;

use async_trait::async_trait;

use crate::error::PantryResult;
use crate::models::{Ingredient, IngredientFields};

#[async_trait]
pub trait IngredientStore: Send + Sync {
    /// Create the backing table if it does not exist. Safe to call repeatedly.
    async fn initialize(&self) -> PantryResult<()>;

    /// Insert a new row. The store assigns the id; ids are never reused.
    ///
    /// The name is not checked here; callers run
    /// [`IngredientFields::validate`] first.
    async fn add(&self, fields: &IngredientFields) -> PantryResult<Ingredient>;

    /// Every row, ordered by ascending id.
    async fn list_all(&self) -> PantryResult<Vec<Ingredient>>;

    /// Overwrite all mutable fields of row `id`. Missing ids are a silent no-op.
    async fn update(&self, id: i64, fields: &IngredientFields) -> PantryResult<()>;

    /// Remove row `id`. Missing ids are a no-op.
    async fn delete(&self, id: i64) -> PantryResult<()>;
}
