//! In-memory [`PassageIndex`] with brute-force cosine search.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Passage;

use super::{rank_by_similarity, PassageIndex};

struct Entry {
    source: String,
    text: String,
    vector: Vec<f32>,
}

#[derive(Default)]
pub struct InMemoryIndex {
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: &str, text: &str, vector: Vec<f32>) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow::anyhow!("in-memory index lock poisoned"))?
            .push(Entry {
                source: source.to_string(),
                text: text.to_string(),
                vector,
            });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PassageIndex for InMemoryIndex {
    async fn nearest(&self, query_vec: &[f32], k: usize) -> Result<Vec<Passage>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("in-memory index lock poisoned"))?;
        Ok(rank_by_similarity(
            query_vec,
            entries
                .iter()
                .map(|e| (e.source.as_str(), e.text.as_str(), e.vector.as_slice())),
            k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nearest_orders_and_truncates() {
        let index = InMemoryIndex::new();
        index.insert("a.md", "tomato", vec![1.0, 0.0]).unwrap();
        index.insert("b.md", "egg", vec![0.0, 1.0]).unwrap();
        index.insert("c.md", "tomato egg", vec![0.7, 0.7]).unwrap();

        let hits = index.nearest(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "a.md");
        assert_eq!(hits[1].source, "c.md");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_nearest_on_empty_index() {
        let index = InMemoryIndex::new();
        assert!(index.is_empty());
        assert!(index.nearest(&[1.0], 5).await.unwrap().is_empty());
    }
}
