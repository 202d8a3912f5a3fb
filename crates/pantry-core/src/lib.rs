//! # Pantry Core
//!
//! Runtime-agnostic logic for Pantry: the ingredient data model, the error
//! taxonomy, freshness classification, the recursive text splitter, the
//! store / index / embedder / generator traits, and the recipe advisor that
//! composes them.
//!
//! This crate contains no tokio, sqlx, HTTP client, or filesystem I/O.
//! The `pantry` application crate supplies the SQLite store, the on-disk
//! vector index, and the network providers.

pub mod advisor;
pub mod chunk;
pub mod embedding;
pub mod error;
pub mod freshness;
pub mod generation;
pub mod index;
pub mod models;
pub mod store;

pub use advisor::{Advisor, AdvisorSettings, AdvisorStrategy};
pub use error::{PantryError, PantryResult};
pub use freshness::{classify, Freshness};
pub use models::{Ingredient, IngredientFields, Passage};
