use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, value::Kind, vectors_config::Config, CreateCollection, Distance, PointStruct,
        SearchPoints, VectorParams, VectorsConfig,
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::entities::product_point::{ProductMatch, ProductPoint, ProductPointPayload},
    helper::error_chain_fmt,
    ports::vector_index_repository::{VectorIndexError, VectorIndexRepository},
};

/// Repository for product chunk vectors (ProductPoint) persisted in Qdrant
pub struct ProductPointQdrantRepository {
    client: QdrantClient,
    collection_name: String,
}

impl ProductPointQdrantRepository {
    #[tracing::instrument(
        name = "Initializing Qdrant and the associated collection",
        skip(client)
    )]
    pub async fn try_new(
        client: QdrantClient,
        collection_name: &str,
        collection_distance: &str,
        collection_vector_size: u64,
    ) -> Result<Self, ProductPointQdrantRepositoryError> {
        let collection_distance = Distance::from_str_name(collection_distance).ok_or(
            ProductPointQdrantRepositoryError::QdrantConfigurationError(
                "Invalid Qdrant distance from configuration".into(),
            ),
        )?;

        match client
            .create_collection(&CreateCollection {
                collection_name: collection_name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: collection_vector_size,
                        distance: collection_distance as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
        {
            Ok(_) => (),
            Err(error) => {
                // Qdrant client only returns anyhow errors for now
                if !error.to_string().contains("already exists") {
                    info!(?error, "Error on collection creation");
                    return Err(ProductPointQdrantRepositoryError::QdrantError(
                        error.to_string(),
                    ));
                }
            }
        };

        Ok(Self {
            client,
            collection_name: collection_name.to_string(),
        })
    }
}

#[async_trait]
impl VectorIndexRepository for ProductPointQdrantRepository {
    #[tracing::instrument(name = "Saving product point to Qdrant", skip(self, point), fields(chunk_id = %point.id))]
    async fn upsert(&self, point: ProductPoint) -> Result<(), VectorIndexError> {
        self.client
            .upsert_points(
                &self.collection_name,
                vec![PointStruct::from(point)],
                None,
            )
            .await
            .map_err(|e| VectorIndexError::IndexError(e.to_string()))?;

        info!("Saved product point");
        Ok(())
    }

    #[tracing::instrument(name = "Searching product points in Qdrant", skip(self, vector))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ProductMatch>, VectorIndexError> {
        let response = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection_name.clone(),
                vector: vector.to_vec(),
                limit: top_k as u64,
                with_payload: Some(true.into()),
                ..Default::default()
            })
            .await
            .map_err(|e| VectorIndexError::IndexError(e.to_string()))?;

        response
            .result
            .into_iter()
            .map(|scored_point| {
                let metadata = ProductPointPayload::try_from(scored_point.payload)?;
                Ok(ProductMatch {
                    score: scored_point.score,
                    metadata,
                })
            })
            .collect()
    }
}

#[derive(thiserror::Error)]
pub enum ProductPointQdrantRepositoryError {
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),

    #[error("Error from Qdrant config: {0}")]
    QdrantConfigurationError(String),
}

impl std::fmt::Debug for ProductPointQdrantRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<ProductPoint> for PointStruct {
    fn from(point: ProductPoint) -> Self {
        // Qdrant only accepts UUID or integer point ids: the chunk id is
        // mapped to a deterministic UUIDv5, so re-upserting the same chunk id
        // overwrites the same point
        let point_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, point.id.as_bytes());

        Self {
            id: Some(point_id.to_string().into()),
            vectors: Some(point.vector.into()),
            payload: point.payload.into(),
        }
    }
}

impl From<ProductPointPayload> for HashMap<String, qdrant::Value> {
    fn from(payload: ProductPointPayload) -> Self {
        let mut map = HashMap::from([
            (
                "schemaVersion".to_string(),
                qdrant::Value::from(payload.schema_version as i64),
            ),
            ("id".to_string(), qdrant::Value::from(payload.id)),
            ("nombre".to_string(), qdrant::Value::from(payload.name)),
            (
                "descripcion".to_string(),
                qdrant::Value::from(payload.description),
            ),
            ("text".to_string(), qdrant::Value::from(payload.text)),
        ]);

        if let Some(cost) = payload.cost {
            map.insert("costo".to_string(), qdrant::Value::from(cost));
        }
        if let Some(base_cost) = payload.base_cost {
            map.insert("precioBase".to_string(), qdrant::Value::from(base_cost));
        }

        map
    }
}

impl TryFrom<HashMap<String, qdrant::Value>> for ProductPointPayload {
    type Error = VectorIndexError;

    fn try_from(payload: HashMap<String, qdrant::Value>) -> Result<Self, Self::Error> {
        let get_string = |key: &str| -> Result<String, VectorIndexError> {
            match payload.get(key).and_then(|v| v.kind.as_ref()) {
                Some(Kind::StringValue(s)) => Ok(s.clone()),
                _ => Err(VectorIndexError::InvalidPayload(format!(
                    "missing or non-string field `{}`",
                    key
                ))),
            }
        };
        // Points written under older schema versions may omit the pricing
        // fields entirely
        let get_number = |key: &str| -> Option<f64> {
            match payload.get(key).and_then(|v| v.kind.as_ref()) {
                Some(Kind::DoubleValue(d)) => Some(*d),
                Some(Kind::IntegerValue(i)) => Some(*i as f64),
                _ => None,
            }
        };

        Ok(Self {
            schema_version: get_number("schemaVersion").map(|v| v as u32).unwrap_or(1),
            id: get_string("id")?,
            name: get_string("nombre")?,
            description: get_string("descripcion")?,
            cost: get_number("costo"),
            base_cost: get_number("precioBase"),
            text: get_string("text")?,
        })
    }
}
