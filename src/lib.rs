//! # Pantry
//!
//! A local inventory of perishable ingredients with a retrieval-augmented
//! recipe advisor.
//!
//! Ingredients live in a SQLite table. Asking for a recipe joins the
//! ingredient names into a query, embeds it, pulls the nearest passages from
//! a vector index built over a recipe corpus, and asks a language model to
//! compose a dish from them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ corpus fetch │──▶│ index build  │──▶│ recipe_index │
//! │  (git clone) │   │ split+embed  │   │   (SQLite)   │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │ nearest-k
//! ┌──────────────┐   ┌──────────────┐   ┌──────▼───────┐
//! │  inventory   │◀──│ shell / CLI  │──▶│   advisor    │──▶ generator
//! │   (SQLite)   │   │              │◀──│ (tokio task) │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pantry init
//! pantry add eggs --quantity 6 --expires 2024-05-01
//! pantry corpus fetch            # clone the recipe corpus once
//! pantry index build             # embed it into ./data/recipe_index
//! pantry recipe
//! pantry shell                   # interactive mode
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`db`] | SQLite connection |
//! | [`migrate`] | Inventory schema |
//! | [`sqlite_store`] | SQLite ingredient store |
//! | [`inventory`] | One-shot inventory commands and table rendering |
//! | [`embedding`] | Embedding providers |
//! | [`generation`] | Text generation providers |
//! | [`corpus`] | Recipe corpus download |
//! | [`vector_index`] | On-disk vector index |
//! | [`index_build`] | Corpus → vector index |
//! | [`recipe`] | Advisor construction and `pantry recipe` |
//! | [`app`] | Interactive shell |
//!
//! Domain types and the advisor itself live in the `pantry-core` crate.

pub mod app;
pub mod config;
pub mod corpus;
pub mod db;
pub mod embedding;
pub mod generation;
pub mod index_build;
pub mod inventory;
pub mod logging;
pub mod migrate;
pub mod recipe;
pub mod sqlite_store;
pub mod vector_index;
