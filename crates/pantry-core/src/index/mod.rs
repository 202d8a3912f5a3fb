//! Read-only nearest-neighbour lookup over embedded recipe passages.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Passage;

/// A persistent vector index built offline from the recipe corpus.
#[async_trait]
pub trait PassageIndex: Send + Sync {
    /// The `k` passages most similar to `query_vec`, best first.
    async fn nearest(&self, query_vec: &[f32], k: usize) -> Result<Vec<Passage>>;
}

/// Rank `(source, text, vector)` entries by cosine similarity to `query_vec`
/// and keep the best `k`. Shared by the in-memory and SQLite indexes.
pub fn rank_by_similarity<'a, I>(query_vec: &[f32], entries: I, k: usize) -> Vec<Passage>
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a [f32])>,
{
    let mut passages: Vec<Passage> = entries
        .into_iter()
        .map(|(source, text, vector)| Passage {
            source: source.to_string(),
            text: text.to_string(),
            score: crate::embedding::cosine_similarity(query_vec, vector) as f64,
        })
        .collect();

    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    passages.truncate(k);
    passages
}
