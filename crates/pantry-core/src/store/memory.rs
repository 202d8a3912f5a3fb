//! In-memory [`IngredientStore`] for tests and embedding in other tools.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{PantryError, PantryResult};
use crate::models::{Ingredient, IngredientFields};

use super::IngredientStore;

struct Inner {
    rows: BTreeMap<i64, Ingredient>,
    next_id: i64,
}

/// `BTreeMap`-backed store. Ids come from a monotonic counter, so a deleted
/// id is never handed out again.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> PantryError {
    PantryError::persistence(anyhow::anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl IngredientStore for InMemoryStore {
    async fn initialize(&self) -> PantryResult<()> {
        Ok(())
    }

    async fn add(&self, fields: &IngredientFields) -> PantryResult<Ingredient> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let id = inner.next_id;
        inner.next_id += 1;
        let row = Ingredient::from_fields(id, fields.clone());
        inner.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> PantryResult<Vec<Ingredient>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, fields: &IngredientFields) -> PantryResult<()> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if let Some(row) = inner.rows.get_mut(&id) {
            *row = Ingredient::from_fields(id, fields.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> PantryResult<()> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.rows.remove(&id);
        Ok(())
    }
}
