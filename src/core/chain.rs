//! Retrieval-Augmented Chat Chain
//!
//! Embeds the user utterance, retrieves the nearest stored chunks, composes
//! the retrieval prompt, and forwards it to the chat provider. Provider and
//! store failures propagate to the caller; there is no retry policy.

use std::sync::Arc;

use thiserror::Error;

use super::embeddings::{EmbeddingError, EmbeddingProvider};
use super::llm::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use super::prompts;
use super::store::{StoreError, VectorStore};

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Retrieval failed: {0}")]
    Store(#[from] StoreError),

    #[error("Completion failed: {0}")]
    Llm(#[from] LlmError),
}

pub type Result<T> = std::result::Result<T, ChainError>;

pub struct RetrievalChain {
    store: VectorStore,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl RetrievalChain {
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            top_k: top_k.max(1),
        }
    }

    /// One retrieval-augmented completion for the given utterance.
    ///
    /// An empty store yields an empty context section; the completion call
    /// still happens.
    pub async fn ask(&self, query: &str) -> Result<String> {
        let query_vec = self.embedder.embed(query).await?;
        let hits = self.store.search(&query_vec, self.top_k).await?;

        tracing::debug!("Retrieved {} chunks for query", hits.len());

        let context = hits
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = prompts::render_retrieval_prompt(&context, query);

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_system(prompts::SUPPORT_SYSTEM_PROMPT);
        let response = self.llm.chat(request).await?;

        Ok(response.content)
    }
}
