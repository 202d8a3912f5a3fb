//! TOML configuration parsing and validation.
//!
//! Every section has defaults, and a missing config file falls back to
//! [`Config::default`], so `pantry add eggs` works on a fresh checkout.
//! Validation rules live in [`load_config`].

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pantry_core::advisor::DEFAULT_TOP_K;
use pantry_core::chunk::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/inventory.sqlite")
}

/// Where the recipe corpus comes from and which files in it are indexed.
#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_url")]
    pub url: String,
    #[serde(default = "default_corpus_branch")]
    pub branch: String,
    #[serde(default = "default_corpus_dir")]
    pub dir: PathBuf,
    /// Subdirectory of `dir` that holds the recipes.
    #[serde(default = "default_corpus_subdir")]
    pub subdir: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_true")]
    pub shallow: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            url: default_corpus_url(),
            branch: default_corpus_branch(),
            dir: default_corpus_dir(),
            subdir: default_corpus_subdir(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            shallow: true,
        }
    }
}

fn default_corpus_url() -> String {
    "https://github.com/Anduin2017/HowToCook.git".to_string()
}
fn default_corpus_branch() -> String {
    "master".to_string()
}
fn default_corpus_dir() -> PathBuf {
    PathBuf::from("./data/HowToCook_repo")
}
fn default_corpus_subdir() -> String {
    "dishes".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/recipe_index")
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for Ollama. Defaults to `http://localhost:11434`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Retries for transient HTTP failures. Zero on the advisory path.
    #[serde(default)]
    pub max_retries: u32,
    /// Request timeout. Unset means wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            url: None,
            batch_size: default_batch_size(),
            max_retries: 0,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            url: None,
            timeout_secs: None,
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_model() -> String {
    "gemma:2b".to_string()
}
fn default_batch_size() -> usize {
    32
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// `retrieval` or `direct`.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_query_separator")]
    pub query_separator: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            top_k: DEFAULT_TOP_K,
            language: default_language(),
            query_separator: default_query_separator(),
        }
    }
}

fn default_strategy() -> String {
    "retrieval".to_string()
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_language() -> String {
    "Traditional Chinese".to_string()
}
fn default_query_separator() -> String {
    "、".to_string()
}

impl Config {
    /// Directory holding the indexed recipes (`corpus.dir/corpus.subdir`).
    pub fn recipes_root(&self) -> PathBuf {
        if self.corpus.subdir.is_empty() || self.corpus.subdir == "." {
            self.corpus.dir.clone()
        } else {
            self.corpus.dir.join(&self.corpus.subdir)
        }
    }
}

/// Load and validate the config at `path`, or the defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.index.chunk_size == 0 {
        bail!("index.chunk_size must be > 0");
    }
    if config.index.chunk_overlap >= config.index.chunk_size {
        bail!("index.chunk_overlap must be smaller than index.chunk_size");
    }
    if config.advisor.top_k == 0 {
        bail!("advisor.top_k must be >= 1");
    }
    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "ollama" | "openai" | "local" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be ollama, openai, or local.",
            other
        ),
    }
    match config.generation.provider.as_str() {
        "ollama" | "openai" => {}
        other => bail!(
            "Unknown generation provider: '{}'. Must be ollama or openai.",
            other
        ),
    }
    match config.advisor.strategy.as_str() {
        "retrieval" | "direct" => {}
        other => bail!(
            "Unknown advisor strategy: '{}'. Must be retrieval or direct.",
            other
        ),
    }

    Ok(())
}
