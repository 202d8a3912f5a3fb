//! Text generation trait.
//!
//! A generator takes one fully assembled prompt and returns the model's raw
//! text. Providers are black boxes: no retry, no rate limiting, no
//! streaming. Implementations live in the `pantry` application crate.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Send `prompt` to the model and return its completion text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
