use std::sync::Arc;

use tracing::info;

use crate::{
    domain::{
        entities::{
            product_point::{ProductPoint, ProductPointPayload},
            product_record::ProductRecord,
        },
        services::chunking::split_fixed_size,
    },
    helper::error_chain_fmt,
    ports::{
        embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
        vector_index_repository::{VectorIndexError, VectorIndexRepository},
    },
};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Chunks a product record, embeds each chunk and upserts it in the vector
/// index, sequentially and in chunk order.
///
/// Sequential on purpose: the embeddings and index services have
/// concurrent-call limits.
///
/// Re-running the same record with the same chunk size overwrites the exact
/// same chunk ids, so the whole pipeline is idempotent.
#[derive(Clone)]
pub struct UpsertPipeline {
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index: Arc<dyn VectorIndexRepository>,
}

/// Outcome of a fully successful upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertReport {
    pub chunks_upserted: usize,
}

impl UpsertPipeline {
    pub fn new(
        embeddings_service: Arc<dyn EmbeddingsService>,
        vector_index: Arc<dyn VectorIndexRepository>,
    ) -> Self {
        Self {
            embeddings_service,
            vector_index,
        }
    }

    /// Upserts every chunk of `record`, stopping at the first failure.
    ///
    /// There is no rollback of the chunks already written: the error carries
    /// how many chunks were upserted before the failure, so the caller can
    /// tell a partial write from a clean failure and decide whether to retry
    /// or repair.
    #[tracing::instrument(name = "Upserting product record", skip(self, record), fields(record_id = %record.id))]
    pub async fn upsert(
        &self,
        record: &ProductRecord,
        chunk_size: usize,
    ) -> Result<UpsertReport, UpsertPipelineError> {
        let text = record.searchable_text();
        let chunks = split_fixed_size(&text, chunk_size);
        let chunks_total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_id = format!("{}-{}", record.id, i + 1);

            let vector = self.embeddings_service.embed(chunk).await.map_err(|source| {
                UpsertPipelineError::EmbeddingsError {
                    source,
                    chunks_upserted: i,
                    chunks_total,
                }
            })?;

            let point = ProductPoint {
                id: chunk_id.clone(),
                vector,
                payload: ProductPointPayload::from_record(record, chunk),
            };

            self.vector_index.upsert(point).await.map_err(|source| {
                UpsertPipelineError::VectorIndexError {
                    source,
                    chunks_upserted: i,
                    chunks_total,
                }
            })?;

            info!(%chunk_id, "Upserted product chunk");
        }

        Ok(UpsertReport {
            chunks_upserted: chunks_total,
        })
    }
}

#[derive(thiserror::Error)]
pub enum UpsertPipelineError {
    #[error(
        "Embedding generation failed with {chunks_upserted}/{chunks_total} chunks already upserted: {source}"
    )]
    EmbeddingsError {
        source: EmbeddingsServiceError,
        chunks_upserted: usize,
        chunks_total: usize,
    },
    #[error(
        "The vector index rejected a chunk with {chunks_upserted}/{chunks_total} chunks already upserted: {source}"
    )]
    VectorIndexError {
        source: VectorIndexError,
        chunks_upserted: usize,
        chunks_total: usize,
    },
}

impl UpsertPipelineError {
    /// Number of chunks durably written before the failure.
    /// Non-zero means the record is partially indexed.
    pub fn chunks_upserted(&self) -> usize {
        match self {
            UpsertPipelineError::EmbeddingsError {
                chunks_upserted, ..
            }
            | UpsertPipelineError::VectorIndexError {
                chunks_upserted, ..
            } => *chunks_upserted,
        }
    }
}

impl std::fmt::Debug for UpsertPipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
