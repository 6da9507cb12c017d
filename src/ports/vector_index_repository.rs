use async_trait::async_trait;

use crate::{
    domain::entities::product_point::{ProductMatch, ProductPoint},
    helper::error_chain_fmt,
};

/// Port to the external nearest-neighbor index storing (id, vector, payload)
/// triples.
///
/// The payload is opaque to the index and returned verbatim on query.
/// Upserting twice with the same id overwrites the previous point
/// (last-write-wins is delegated to the index).
#[async_trait]
pub trait VectorIndexRepository: Send + Sync {
    async fn upsert(&self, point: ProductPoint) -> Result<(), VectorIndexError>;

    /// Returns at most `top_k` matches, ordered by descending similarity score
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ProductMatch>, VectorIndexError>;
}

#[derive(thiserror::Error)]
pub enum VectorIndexError {
    #[error("The vector index rejected the operation: {0}")]
    IndexError(String),
    #[error("A stored payload could not be read back: {0}")]
    InvalidPayload(String),
}

impl std::fmt::Debug for VectorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
