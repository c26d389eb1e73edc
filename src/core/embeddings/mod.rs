//! Embedding Provider Module
//!
//! Defines the EmbeddingProvider trait used by indexing and retrieval.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get provider name
    fn name(&self) -> &str;

    /// Check if provider is healthy/available
    async fn health_check(&self) -> bool;
}
