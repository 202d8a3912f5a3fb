//! `pantry index build`: turn the recipe corpus into a vector index.
//!
//! Scans the recipes directory with include/exclude globs, splits every
//! document with the configured [`TextSplitter`], embeds the chunks in
//! batches, and writes them to a fresh [`SqliteVectorIndex`]. A build that
//! fails part way removes the half-written index directory.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use pantry_core::chunk::{chunk_document, TextSplitter};
use pantry_core::embedding::Embedder;
use pantry_core::models::Chunk;

use crate::config::Config;
use crate::embedding;
use crate::vector_index::{index_exists, IndexMeta, SqliteVectorIndex};

/// A corpus file selected for indexing.
#[derive(Debug, Clone)]
pub struct RecipeDocument {
    /// Path relative to the recipes root, `/`-separated.
    pub source: String,
    pub body: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: usize,
    pub chunks: usize,
    pub dims: usize,
}

/// CLI entry point.
pub async fn run_build(config: &Config, force: bool) -> Result<()> {
    let index_dir = &config.index.dir;
    if index_exists(index_dir) && !force {
        println!(
            "index '{}' already exists, skipping build.",
            index_dir.display()
        );
        println!("  pass --force to rebuild it");
        return Ok(());
    }

    let embedder = embedding::create_embedder(&config.embedding)?;
    let stats = build_index(config, embedder.as_ref()).await?;

    println!("index build");
    println!("  documents: {}", stats.documents);
    println!("  chunks: {}", stats.chunks);
    println!("  model: {} ({} dims)", embedder.model_name(), stats.dims);
    println!("  dir: {}", index_dir.display());
    println!("ok");
    Ok(())
}

/// Rebuild the index from scratch with `embedder`.
pub async fn build_index(config: &Config, embedder: &dyn Embedder) -> Result<BuildStats> {
    let root = config.recipes_root();
    let documents = scan_recipes(
        &root,
        &config.corpus.include_globs,
        &config.corpus.exclude_globs,
    )?;
    if documents.is_empty() {
        bail!("no recipe documents matched under '{}'", root.display());
    }

    let index_dir = config.index.dir.clone();
    if index_dir.exists() {
        std::fs::remove_dir_all(&index_dir).with_context(|| {
            format!("Failed to remove old index: {}", index_dir.display())
        })?;
    }

    let splitter = TextSplitter::new(config.index.chunk_size, config.index.chunk_overlap);
    let result = write_index(
        &index_dir,
        &documents,
        &splitter,
        embedder,
        config.embedding.batch_size.max(1),
    )
    .await;

    if result.is_err() && index_dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(&index_dir) {
            warn!(error = %e, dir = %index_dir.display(), "failed to clean up partial index");
        }
    }
    result
}

async fn write_index(
    index_dir: &Path,
    documents: &[RecipeDocument],
    splitter: &TextSplitter,
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<BuildStats> {
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunk_document(&doc.source, &doc.body, splitter))
        .collect();
    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        chunk_size = splitter.chunk_size(),
        chunk_overlap = splitter.chunk_overlap(),
        "split recipe corpus"
    );

    let index = SqliteVectorIndex::create(index_dir).await?;
    let mut dims = 0usize;

    for (n, batch) in chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder
            .embed(&texts)
            .await
            .with_context(|| format!("embedding batch {} failed", n + 1))?;

        if let Some(first) = vectors.first() {
            if dims == 0 {
                dims = first.len();
            } else if first.len() != dims {
                bail!(
                    "embedding dimension changed mid-build: expected {}, got {}",
                    dims,
                    first.len()
                );
            }
        }

        index.insert(batch, &vectors).await?;
        info!(batch = n + 1, size = batch.len(), "embedded batch");
    }

    index
        .set_meta(&IndexMeta {
            model: embedder.model_name().to_string(),
            dims,
        })
        .await?;
    index.close().await;

    Ok(BuildStats {
        documents: documents.len(),
        chunks: chunks.len(),
        dims,
    })
}

/// Collect matching files under `root`, sorted by relative path.
pub fn scan_recipes(
    root: &Path,
    include_globs: &[String],
    exclude_globs: &[String],
) -> Result<Vec<RecipeDocument>> {
    if !root.exists() {
        bail!(
            "recipe directory not found: {}. Run `pantry corpus fetch` first.",
            root.display()
        );
    }

    let include_set = build_globset(include_globs)?;
    let mut excludes = vec!["**/.git/**".to_string()];
    excludes.extend(exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut documents = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let source = to_source(relative.to_path_buf());

        if exclude_set.is_match(&source) || !include_set.is_match(&source) {
            continue;
        }

        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        documents.push(RecipeDocument { source, body });
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(documents)
}

fn to_source(relative: PathBuf) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}
