//! Wiring between configuration and the recipe [`Advisor`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use pantry_core::advisor::{Advisor, AdvisorSettings, AdvisorStrategy};
use pantry_core::embedding::Embedder;
use pantry_core::generation::Generator;
use pantry_core::index::PassageIndex;
use pantry_core::models::Passage;
use pantry_core::store::IngredientStore;

use crate::config::Config;
use crate::embedding;
use crate::generation;
use crate::inventory::open_store;
use crate::vector_index::SqliteVectorIndex;

/// Stands in for a vector index that could not be opened.
///
/// Opening is deferred to the first lookup so that an empty inventory is
/// still reported as such when no index has been built yet.
struct UnavailableIndex {
    reason: String,
}

#[async_trait]
impl PassageIndex for UnavailableIndex {
    async fn nearest(&self, _query_vec: &[f32], _k: usize) -> Result<Vec<Passage>> {
        Err(anyhow!("{}", self.reason))
    }
}

/// Stands in for an embedding provider that failed to initialize.
struct UnavailableEmbedder {
    model: String,
    reason: String,
}

#[async_trait]
impl Embedder for UnavailableEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("embedding provider not initialized: {}", self.reason))
    }
}

/// Stands in for a generation provider that failed to initialize.
struct UnavailableGenerator {
    model: String,
    reason: String,
}

#[async_trait]
impl Generator for UnavailableGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("generation provider not initialized: {}", self.reason))
    }
}

/// Build an advisor for `store` from the `[advisor]`, `[embedding]`,
/// `[generation]`, and `[index]` sections.
///
/// Never fails: a provider or index that cannot be set up is replaced by a
/// stand-in whose every call returns the setup error, so the inventory stays
/// usable and recipe requests report the reason as a diagnostic.
pub async fn build_advisor(config: &Config, store: Arc<dyn IngredientStore>) -> Advisor {
    let generator: Arc<dyn Generator> = match generation::create_generator(&config.generation) {
        Ok(generator) => generator,
        Err(e) => {
            warn!(error = %e, "generation provider unavailable");
            Arc::new(UnavailableGenerator {
                model: config.generation.model.clone(),
                reason: format!("{:#}", e),
            })
        }
    };

    let strategy = match config.advisor.strategy.as_str() {
        "direct" => AdvisorStrategy::Direct,
        _ => {
            let embedder: Arc<dyn Embedder> = match embedding::create_embedder(&config.embedding)
            {
                Ok(embedder) => embedder,
                Err(e) => {
                    warn!(error = %e, "embedding provider unavailable");
                    Arc::new(UnavailableEmbedder {
                        model: config.embedding.model.clone(),
                        reason: format!("{:#}", e),
                    })
                }
            };
            let opened = SqliteVectorIndex::open(&config.index.dir).await;
            let index: Arc<dyn PassageIndex> = match opened {
                Ok(index) => {
                    if let Ok(Some(meta)) = index.meta().await {
                        if meta.model != embedder.model_name() {
                            warn!(
                                index_model = %meta.model,
                                embedder_model = embedder.model_name(),
                                "vector index was built with a different embedding model"
                            );
                        }
                    }
                    Arc::new(index)
                }
                Err(e) => Arc::new(UnavailableIndex {
                    reason: format!("{:#}", e),
                }),
            };
            AdvisorStrategy::RetrievalAugmented {
                embedder,
                index,
                top_k: config.advisor.top_k,
            }
        }
    };

    let settings = AdvisorSettings {
        language: config.advisor.language.clone(),
        query_separator: config.advisor.query_separator.clone(),
    };
    Advisor::new(store, generator, strategy, settings)
}

/// CLI entry point for `pantry recipe`: print one recipe or a diagnostic.
pub async fn run_recipe(config: &Config) -> Result<()> {
    let store = Arc::new(open_store(config).await?);
    let advisor = build_advisor(config, store.clone()).await;
    println!("{}", advisor.advise().await);
    store.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::advisor::EMPTY_INVENTORY_MESSAGE;
    use pantry_core::models::IngredientFields;
    use pantry_core::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn offline_config(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.index.dir = tmp.path().join("missing-index");
        config.embedding.url = Some("http://127.0.0.1:1".to_string());
        config.generation.url = Some("http://127.0.0.1:1".to_string());
        config
    }

    #[tokio::test]
    async fn test_empty_inventory_without_index() {
        let tmp = TempDir::new().unwrap();
        let config = offline_config(&tmp);
        let advisor = build_advisor(&config, Arc::new(InMemoryStore::new())).await;
        assert_eq!(advisor.strategy().name(), "retrieval");
        assert_eq!(advisor.advise().await, EMPTY_INVENTORY_MESSAGE);
    }

    #[tokio::test]
    async fn test_direct_strategy_reports_unreachable_generator() {
        let tmp = TempDir::new().unwrap();
        let mut config = offline_config(&tmp);
        config.advisor.strategy = "direct".to_string();

        let store = Arc::new(InMemoryStore::new());
        store
            .add(&IngredientFields::new("egg", None, None, None))
            .await
            .unwrap();

        let advisor = build_advisor(&config, store).await;
        assert_eq!(advisor.strategy().name(), "direct");
        let text = advisor.advise().await;
        assert!(text.starts_with("Recipe generation failed:"));
        assert!(text.contains("Ollama connection error"));
    }

    #[tokio::test]
    async fn test_retrieval_reports_missing_index() {
        let tmp = TempDir::new().unwrap();
        let config = offline_config(&tmp);

        let store = Arc::new(InMemoryStore::new());
        store
            .add(&IngredientFields::new("tofu", None, None, None))
            .await
            .unwrap();

        let advisor = build_advisor(&config, store).await;
        let text = advisor.advise().await;
        assert!(text.starts_with("Recipe generation failed:"));
    }

    #[tokio::test]
    async fn test_unbuildable_generator_becomes_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let mut config = offline_config(&tmp);
        config.advisor.strategy = "direct".to_string();
        config.generation.provider = "carrier-pigeon".to_string();

        let store = Arc::new(InMemoryStore::new());
        let advisor = build_advisor(&config, store.clone()).await;
        assert_eq!(advisor.advise().await, EMPTY_INVENTORY_MESSAGE);

        store
            .add(&IngredientFields::new("egg", None, None, None))
            .await
            .unwrap();
        let text = advisor.advise().await;
        assert!(text.starts_with("Recipe generation failed:"));
        assert!(text.contains("generation provider not initialized"));
        assert!(text.contains("Unknown generation provider: carrier-pigeon"));
    }

    #[tokio::test]
    async fn test_unbuildable_embedder_becomes_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let mut config = offline_config(&tmp);
        config.embedding.provider = "carrier-pigeon".to_string();

        let store = Arc::new(InMemoryStore::new());
        store
            .add(&IngredientFields::new("egg", None, None, None))
            .await
            .unwrap();

        let advisor = build_advisor(&config, store).await;
        assert_eq!(advisor.strategy().name(), "retrieval");
        let text = advisor.advise().await;
        assert!(text.contains("embedding provider not initialized"));
        assert!(text.contains("Unknown embedding provider: carrier-pigeon"));
    }

    #[cfg(not(feature = "local-embeddings-fastembed"))]
    #[tokio::test]
    async fn test_run_recipe_with_local_provider_disabled() {
        let tmp = TempDir::new().unwrap();
        let mut config = offline_config(&tmp);
        config.db.path = tmp.path().join("inventory.sqlite");
        config.embedding.provider = "local".to_string();

        let store = open_store(&config).await.unwrap();
        store
            .add(&IngredientFields::new("egg", None, None, None))
            .await
            .unwrap();
        store.close().await;

        run_recipe(&config).await.unwrap();
    }
}
