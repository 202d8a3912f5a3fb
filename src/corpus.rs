//! Recipe corpus acquisition.
//!
//! Clones the configured Git repository into `corpus.dir` once. An existing
//! directory is left untouched; delete it to fetch again.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::config::{Config, CorpusConfig};

/// Outcome of [`fetch_corpus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned,
    AlreadyPresent,
}

/// CLI entry point for `pantry corpus fetch`.
pub fn run_fetch(config: &Config) -> Result<()> {
    let corpus = &config.corpus;
    match fetch_corpus(corpus)? {
        FetchOutcome::AlreadyPresent => {
            println!(
                "corpus '{}' already exists, skipping download.",
                corpus.dir.display()
            );
            println!("  delete the directory to fetch it again");
        }
        FetchOutcome::Cloned => {
            println!("corpus fetched");
            println!("  url: {}", corpus.url);
            println!("  dir: {}", corpus.dir.display());
        }
    }
    Ok(())
}

pub fn fetch_corpus(corpus: &CorpusConfig) -> Result<FetchOutcome> {
    if corpus.dir.exists() {
        info!(dir = %corpus.dir.display(), "corpus already present");
        return Ok(FetchOutcome::AlreadyPresent);
    }

    info!(url = %corpus.url, branch = %corpus.branch, "cloning recipe corpus");
    git_clone(&corpus.url, &corpus.branch, corpus.shallow, &corpus.dir)?;
    Ok(FetchOutcome::Cloned)
}

fn git_clone(url: &str, branch: &str, shallow: bool, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create corpus parent directory: {}", parent.display())
            })?;
        }
    }

    let mut cmd = Command::new("git");
    cmd.args(["clone", "--branch", branch, "--single-branch"]);
    if shallow {
        cmd.args(["--depth", "1"]);
    }
    cmd.arg(url);
    cmd.arg(dest);

    let output = cmd
        .output()
        .with_context(|| "Failed to execute 'git clone'. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git clone failed: {}", stderr.trim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_dir_is_not_refetched() {
        let tmp = TempDir::new().unwrap();
        let corpus = CorpusConfig {
            url: "file:///nonexistent/repo.git".to_string(),
            dir: tmp.path().to_path_buf(),
            ..CorpusConfig::default()
        };
        assert_eq!(fetch_corpus(&corpus).unwrap(), FetchOutcome::AlreadyPresent);
    }
}
