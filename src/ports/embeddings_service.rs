use async_trait::async_trait;

use crate::{domain::entities::product_point::Embeddings, helper::error_chain_fmt};

/// Port to a service generating a fixed-dimension embedding from a text.
///
/// A remote, potentially-failing call: implementations do not retry, the
/// caller decides what to do with a failure.
#[async_trait]
pub trait EmbeddingsService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbeddingsServiceError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingsServiceError {
    #[error("The embeddings service rejected the request: {0}")]
    RequestRejected(String),
    #[error("The embeddings service could not be reached: {0}")]
    UnreachableService(String),
    #[error("The embeddings service response did not carry a usable embedding: {0}")]
    MissingEmbedding(String),
}

impl std::fmt::Debug for EmbeddingsServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
