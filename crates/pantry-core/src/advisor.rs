//! Recipe advisor: turns the current inventory into a recipe.
//!
//! Two strategies share one entry point:
//!
//! - **Retrieval-augmented**: join ingredient names into a query, embed it,
//!   fetch the `top_k` nearest corpus passages, and ask the generator to
//!   compose a dish grounded in those passages.
//! - **Direct**: skip retrieval and ask the generator for one or two
//!   recipes from the `name (quantity)` list alone.
//!
//! [`Advisor::generate`] returns typed errors; [`Advisor::advise`] is the
//! presentation-facing variant that never fails and renders every error as
//! a diagnostic string.

use std::sync::Arc;

use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::error::{PantryError, PantryResult};
use crate::generation::Generator;
use crate::index::PassageIndex;
use crate::models::{Ingredient, Passage};
use crate::store::IngredientStore;

/// Number of passages retrieved per request unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Shown instead of a recipe when the inventory has no rows.
pub const EMPTY_INVENTORY_MESSAGE: &str = "The inventory is empty. Add some ingredients first!";

/// Shown while a request is in flight.
pub const IN_PROGRESS_MESSAGE: &str =
    "Searching the recipe library for inspiration, please wait...";

/// How the advisor builds its prompt.
#[derive(Clone)]
pub enum AdvisorStrategy {
    RetrievalAugmented {
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn PassageIndex>,
        top_k: usize,
    },
    Direct,
}

impl AdvisorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AdvisorStrategy::RetrievalAugmented { .. } => "retrieval",
            AdvisorStrategy::Direct => "direct",
        }
    }
}

impl std::fmt::Debug for AdvisorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisorStrategy::RetrievalAugmented {
                embedder, top_k, ..
            } => f
                .debug_struct("RetrievalAugmented")
                .field("embedder", &embedder.model_name())
                .field("top_k", top_k)
                .finish(),
            AdvisorStrategy::Direct => f.write_str("Direct"),
        }
    }
}

/// Prompt settings shared by both strategies.
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    /// Natural language the recipe must be written in.
    pub language: String,
    /// Joins ingredient names into the retrieval query.
    pub query_separator: String,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            language: "Traditional Chinese".to_string(),
            query_separator: "、".to_string(),
        }
    }
}

pub struct Advisor {
    store: Arc<dyn IngredientStore>,
    generator: Arc<dyn Generator>,
    strategy: AdvisorStrategy,
    settings: AdvisorSettings,
}

impl Advisor {
    pub fn new(
        store: Arc<dyn IngredientStore>,
        generator: Arc<dyn Generator>,
        strategy: AdvisorStrategy,
        settings: AdvisorSettings,
    ) -> Self {
        Self {
            store,
            generator,
            strategy,
            settings,
        }
    }

    pub fn strategy(&self) -> &AdvisorStrategy {
        &self.strategy
    }

    /// Run one advisory request end to end.
    ///
    /// Fails with [`PantryError::EmptyInventory`] before any provider is
    /// contacted when the store has no rows.
    pub async fn generate(&self) -> PantryResult<String> {
        let ingredients = self.store.list_all().await?;
        if ingredients.is_empty() {
            return Err(PantryError::EmptyInventory);
        }

        let prompt = match &self.strategy {
            AdvisorStrategy::RetrievalAugmented {
                embedder,
                index,
                top_k,
            } => {
                let query = compose_query(&ingredients, &self.settings.query_separator);
                let query_vec = embedder
                    .embed_query(&query)
                    .await
                    .map_err(PantryError::AdvisoryService)?;
                let passages = index
                    .nearest(&query_vec, *top_k)
                    .await
                    .map_err(PantryError::AdvisoryService)?;
                info!(
                    strategy = "retrieval",
                    ingredients = ingredients.len(),
                    passages = passages.len(),
                    "retrieved reference passages"
                );
                retrieval_prompt(&passages, &query, &self.settings.language)
            }
            AdvisorStrategy::Direct => {
                info!(
                    strategy = "direct",
                    ingredients = ingredients.len(),
                    "building direct prompt"
                );
                direct_prompt(&ingredients, &self.settings.language)
            }
        };

        self.generator
            .generate(&prompt)
            .await
            .map_err(PantryError::AdvisoryService)
    }

    /// [`generate`](Self::generate), with every error rendered by [`diagnostic`].
    pub async fn advise(&self) -> String {
        match self.generate().await {
            Ok(text) => text,
            Err(err) => {
                if !matches!(err, PantryError::EmptyInventory) {
                    warn!(
                        error = %err,
                        model = self.generator.model_name(),
                        "recipe generation failed"
                    );
                }
                diagnostic(&err)
            }
        }
    }
}

/// User-facing text for a failed advisory request.
pub fn diagnostic(err: &PantryError) -> String {
    match err {
        PantryError::EmptyInventory => EMPTY_INVENTORY_MESSAGE.to_string(),
        other => format!(
            "Recipe generation failed:\n{}\n\nCheck that the embedding and generation services are running and reachable.",
            other
        ),
    }
}

/// Join ingredient names into a single free-text query.
pub fn compose_query(ingredients: &[Ingredient], separator: &str) -> String {
    ingredients
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Prompt for the retrieval-augmented strategy.
pub fn retrieval_prompt(passages: &[Passage], query: &str, language: &str) -> String {
    let context = if passages.is_empty() {
        "(no reference recipes were found)".to_string()
    } else {
        passages
            .iter()
            .map(|p| format!("[{}]\n{}", p.source, p.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "You are an experienced home cook. Base your answer strictly on the REFERENCE RECIPES below.\n\
         Combine what the reference recipes say with the AVAILABLE INGREDIENTS the user has, and design one dish with a detailed recipe.\n\
         If the reference recipes are insufficient, fill the gaps from your own expertise, but most of the content must come from the references.\n\
         Answer in {language}.\n\
         \n\
         REFERENCE RECIPES\n\
         {context}\n\
         \n\
         AVAILABLE INGREDIENTS\n\
         {query}\n\
         \n\
         Give one complete recipe: the dish name, the ingredients needed, and detailed steps."
    )
}

/// Prompt for the direct strategy.
pub fn direct_prompt(ingredients: &[Ingredient], language: &str) -> String {
    let list = ingredients
        .iter()
        .map(|i| match i.quantity.as_deref() {
            Some(q) => format!("- {} ({})", i.name, q),
            None => format!("- {}", i.name),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a creative home cook. I have the following ingredients:\n\
         {list}\n\
         \n\
         Suggest 1 to 2 dishes I can make with them. For each dish give the name, an ingredient list, and step-by-step instructions.\n\
         Answer in {language}."
    )
}
