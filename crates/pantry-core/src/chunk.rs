//! Recursive character text splitter.
//!
//! Splits corpus documents into [`Chunk`]s of at most `chunk_size`
//! characters, with up to `chunk_overlap` characters carried over between
//! consecutive chunks. Splitting prefers paragraph breaks, then line breaks,
//! then spaces, and finally individual characters; separators stay attached
//! to the piece that follows them.
//!
//! Lengths are counted in `char`s, not bytes, so multi-byte scripts (the
//! default corpus is Chinese) get the same budget as ASCII.

use std::collections::VecDeque;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

/// Default chunk size used by the index builder.
pub const DEFAULT_CHUNK_SIZE: usize = 750;
/// Default overlap used by the index builder.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty pieces.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, retaining a tail of at most
    /// `chunk_overlap` characters as the start of the next chunk.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(doc) = join(&window) {
                    out.push(doc);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        if let Some(doc) = join(&window) {
            out.push(doc);
        }
        out
    }
}

/// Split a corpus document into indexed [`Chunk`]s.
///
/// Empty or whitespace-only documents produce no chunks.
pub fn chunk_document(source: &str, text: &str, splitter: &TextSplitter) -> Vec<Chunk> {
    splitter
        .split_text(text)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| make_chunk(source, i as i64, piece))
        .collect()
}

fn make_chunk(source: &str, index: i64, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source: source.to_string(),
        chunk_index: index,
        text,
        hash,
    }
}

fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    for (i, part) in text.split(separator).enumerate() {
        let piece = if i == 0 {
            part.to_string()
        } else {
            format!("{separator}{part}")
        };
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }
    pieces
}

fn join(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (1..=n)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = TextSplitter::default().split_text("Hello, world!");
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(TextSplitter::default().split_text("").is_empty());
        assert!(TextSplitter::default().split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size() {
        let splitter = TextSplitter::new(50, 10);
        let text = words(200);
        for c in splitter.split_text(&text) {
            assert!(c.chars().count() <= 50, "chunk too long: {}", c);
        }
    }

    /// Length in chars of the longest suffix of `a` that is a prefix of `b`.
    fn shared_overlap(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        (1..=a.len().min(b.len()))
            .rev()
            .find(|&n| a[a.len() - n..] == b[..n])
            .unwrap_or(0)
    }

    fn assert_bounded_overlap(splitter: &TextSplitter, text: &str) {
        let chunks = splitter.split_text(text);
        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            assert!(pair[0].chars().count() <= splitter.chunk_size());
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].contains(first_word),
                "{:?} does not carry over into {:?}",
                pair[0],
                pair[1]
            );
            let shared = shared_overlap(&pair[0], &pair[1]);
            assert!(shared > 0);
            assert!(
                shared <= splitter.chunk_overlap(),
                "{} shared chars exceed overlap {}",
                shared,
                splitter.chunk_overlap()
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        assert_bounded_overlap(&TextSplitter::new(50, 10), &words(200));
    }

    #[test]
    fn test_consecutive_chunks_overlap_default_sizes() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.chunk_size(), 750);
        assert_eq!(splitter.chunk_overlap(), 100);
        assert_bounded_overlap(&splitter, &words(2000));
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let a = "a".repeat(30);
        let b = "b".repeat(30);
        let splitter = TextSplitter::new(40, 0);
        let chunks = splitter.split_text(&format!("{a}\n\n{b}"));
        assert_eq!(chunks, vec![a, b]);
    }

    #[test]
    fn test_long_run_without_separators_is_cut() {
        let splitter = TextSplitter::new(10, 2);
        let chunks = splitter.split_text(&"x".repeat(35));
        assert!(chunks.len() >= 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let splitter = TextSplitter::new(10, 0);
        let text = "番茄炒蛋是一道家常菜";
        assert_eq!(text.chars().count(), 10);
        assert_eq!(splitter.split_text(text).len(), 1);
    }

    #[test]
    fn test_overlap_clamped() {
        let splitter = TextSplitter::new(5, 50);
        assert_eq!(splitter.chunk_overlap(), 4);
    }

    #[test]
    fn test_chunk_document_indices_contiguous() {
        let splitter = TextSplitter::new(40, 5);
        let chunks = chunk_document("dishes/egg.md", &words(80), &splitter);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64);
            assert_eq!(c.source, "dishes/egg.md");
            assert_eq!(c.hash.len(), 64);
        }
    }
}
