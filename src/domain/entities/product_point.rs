use serde::{Deserialize, Serialize};

use super::product_record::ProductRecord;

pub type Embeddings = Vec<f32>;

/// Version written with every new payload.
///
/// Older deployments stored name/description only (1), then added the cost (2).
/// The base cost arrived with version 3.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 3;

/// One chunk of a product record, ready to be upserted in the vector index.
///
/// `id` is the chunk id: `"{parent_id}-{1-based chunk index}"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductPoint {
    pub id: String,
    pub vector: Embeddings,
    pub payload: ProductPointPayload,
}

/// Payload stored next to a chunk vector, and returned verbatim on query.
///
/// It always carries the *parent* record's fields, even though the vector
/// represents a single chunk: `text` is the only chunk-specific field.
///
/// The wire names are the ones the first deployment of this service used.
/// `costo` and `precioBase` are optional on read so points written under an
/// older schema version remain readable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProductPointPayload {
    #[serde(rename = "schemaVersion", default = "first_schema_version")]
    pub schema_version: u32,
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "costo", default)]
    pub cost: Option<f64>,
    #[serde(rename = "precioBase", default)]
    pub base_cost: Option<f64>,
    pub text: String,
}

fn first_schema_version() -> u32 {
    1
}

impl ProductPointPayload {
    /// Payload shared by every chunk of `record`, with `chunk_text` as the
    /// chunk-specific text
    pub fn from_record(record: &ProductRecord, chunk_text: &str) -> Self {
        Self {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            cost: Some(record.cost),
            base_cost: Some(record.base_cost),
            text: chunk_text.to_string(),
        }
    }
}

/// A query hit, ordered by descending similarity score by the index
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductMatch {
    pub score: f32,
    pub metadata: ProductPointPayload,
}
