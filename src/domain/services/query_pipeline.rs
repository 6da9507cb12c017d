use std::sync::Arc;

use crate::{
    domain::entities::product_point::ProductMatch,
    helper::error_chain_fmt,
    ports::{
        embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
        vector_index_repository::{VectorIndexError, VectorIndexRepository},
    },
};

pub const DEFAULT_TOP_K: usize = 1;

/// Embeds a free-text query and retrieves the closest stored chunks from the
/// vector index, with their payloads.
#[derive(Clone)]
pub struct QueryPipeline {
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index: Arc<dyn VectorIndexRepository>,
}

impl QueryPipeline {
    pub fn new(
        embeddings_service: Arc<dyn EmbeddingsService>,
        vector_index: Arc<dyn VectorIndexRepository>,
    ) -> Self {
        Self {
            embeddings_service,
            vector_index,
        }
    }

    /// Returns at most `top_k` matches ordered by descending similarity, as
    /// provided by the index. A failure on either step propagates: no partial
    /// result.
    #[tracing::instrument(name = "Querying products by text", skip(self))]
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<ProductMatch>, QueryPipelineError> {
        let vector = self.embeddings_service.embed(text).await?;

        let matches = self.vector_index.query(&vector, top_k).await?;

        Ok(matches)
    }
}

#[derive(thiserror::Error)]
pub enum QueryPipelineError {
    #[error("Embedding the query text failed: {0}")]
    EmbeddingsError(#[from] EmbeddingsServiceError),
    #[error("Querying the vector index failed: {0}")]
    VectorIndexError(#[from] VectorIndexError),
}

impl std::fmt::Debug for QueryPipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
