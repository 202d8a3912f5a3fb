//! Directory-backed vector index over recipe passages.
//!
//! The index directory holds a single SQLite file, `index.sqlite`:
//!
//! | Table | Contents |
//! |-------|----------|
//! | `passages` | chunk id, corpus-relative source path, chunk index, text, SHA-256 |
//! | `passage_vectors` | chunk id → little-endian f32 embedding BLOB |
//! | `index_meta` | `model` and `dims` of the embedder that built it |
//!
//! Lookups are brute-force cosine similarity over every stored vector,
//! which is fine for a corpus of a few thousand chunks.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use pantry_core::embedding::{blob_to_vec, vec_to_blob};
use pantry_core::index::{rank_by_similarity, PassageIndex};
use pantry_core::models::{Chunk, Passage};

pub const INDEX_FILE: &str = "index.sqlite";

/// Embedder identity recorded at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMeta {
    pub model: String,
    pub dims: usize,
}

pub struct SqliteVectorIndex {
    pool: SqlitePool,
}

/// Whether `dir` already contains a built index.
pub fn index_exists(dir: &Path) -> bool {
    dir.join(INDEX_FILE).exists()
}

impl SqliteVectorIndex {
    /// Open an existing index for querying.
    pub async fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            bail!(
                "vector index not found at '{}'. Run `pantry index build` first.",
                dir.display()
            );
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open vector index: {}", path.display()))?;

        Ok(Self { pool })
    }

    /// Create an empty index in `dir`, creating the directory if needed.
    pub async fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;
        let path = dir.join(INDEX_FILE);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS passages (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                text TEXT NOT NULL,
                hash TEXT NOT NULL,
                UNIQUE(source, chunk_index)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS passage_vectors (
                passage_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                FOREIGN KEY (passage_id) REFERENCES passages(id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Store a batch of chunks with their vectors in one transaction.
    pub async fn insert(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != vectors.len() {
            bail!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }

        let mut tx = self.pool.begin().await?;
        for (chunk, vector) in chunks.iter().zip(vectors) {
            sqlx::query(
                "INSERT INTO passages (id, source, chunk_index, text, hash) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(&chunk.source)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO passage_vectors (passage_id, embedding) VALUES (?, ?)")
                .bind(&chunk.id)
                .bind(vec_to_blob(vector))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn set_meta(&self, meta: &IndexMeta) -> Result<()> {
        for (key, value) in [("model", meta.model.clone()), ("dims", meta.dims.to_string())] {
            sqlx::query(
                r#"
                INSERT INTO index_meta (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn meta(&self) -> Result<Option<IndexMeta>> {
        let rows = sqlx::query("SELECT key, value FROM index_meta")
            .fetch_all(&self.pool)
            .await?;

        let mut model = None;
        let mut dims = None;
        for row in &rows {
            let key: String = row.get("key");
            let value: String = row.get("value");
            match key.as_str() {
                "model" => model = Some(value),
                "dims" => dims = value.parse::<usize>().ok(),
                _ => {}
            }
        }

        Ok(match (model, dims) {
            (Some(model), Some(dims)) => Some(IndexMeta { model, dims }),
            _ => None,
        })
    }

    pub async fn passage_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM passages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PassageIndex for SqliteVectorIndex {
    async fn nearest(&self, query_vec: &[f32], k: usize) -> Result<Vec<Passage>> {
        let rows = sqlx::query(
            r#"
            SELECT p.source, p.text, v.embedding
            FROM passage_vectors v
            JOIN passages p ON p.id = v.passage_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let entries: Vec<(String, String, Vec<f32>)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                (row.get("source"), row.get("text"), blob_to_vec(&blob))
            })
            .collect();

        Ok(rank_by_similarity(
            query_vec,
            entries
                .iter()
                .map(|(source, text, vector)| (source.as_str(), text.as_str(), vector.as_slice())),
            k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::chunk::{chunk_document, TextSplitter};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_index_fails() {
        let tmp = TempDir::new().unwrap();
        let err = SqliteVectorIndex::open(&tmp.path().join("idx"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("pantry index build"));
    }

    #[tokio::test]
    async fn test_insert_then_query_nearest() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("idx");
        let splitter = TextSplitter::default();

        let index = SqliteVectorIndex::create(&dir).await.unwrap();
        let mut chunks = chunk_document("tomato.md", "Tomato and egg.", &splitter);
        chunks.extend(chunk_document("tofu.md", "Mapo tofu.", &splitter));
        chunks.extend(chunk_document("rice.md", "Fried rice.", &splitter));
        let vectors = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.6, 0.0, 0.8]];
        index.insert(&chunks, &vectors).await.unwrap();
        index
            .set_meta(&IndexMeta {
                model: "fake".to_string(),
                dims: 3,
            })
            .await
            .unwrap();
        index.close().await;

        assert!(index_exists(&dir));
        let index = SqliteVectorIndex::open(&dir).await.unwrap();
        assert_eq!(index.passage_count().await.unwrap(), 3);
        assert_eq!(
            index.meta().await.unwrap(),
            Some(IndexMeta {
                model: "fake".to_string(),
                dims: 3
            })
        );

        let hits = index.nearest(&[1.0, 0.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "tomato.md");
        assert_eq!(hits[0].text, "Tomato and egg.");
        assert_eq!(hits[1].source, "rice.md");
    }

    #[tokio::test]
    async fn test_insert_rejects_length_mismatch() {
        let tmp = TempDir::new().unwrap();
        let index = SqliteVectorIndex::create(&tmp.path().join("idx")).await.unwrap();
        let chunks = chunk_document("a.md", "text", &TextSplitter::default());
        assert!(index.insert(&chunks, &[]).await.is_err());
    }
}
