use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::EmbeddingsSettings,
    domain::entities::product_point::Embeddings,
    ports::embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
};

/// Embeddings generated by an OpenAI-compatible `/embeddings` endpoint.
///
/// The service was deployed with `text-embedding-3-large` truncated to 256
/// dimensions; both are configurable.
pub struct OpenAiEmbeddingsRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingsRepository {
    pub fn new(settings: &EmbeddingsSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingsService for OpenAiEmbeddingsRepository {
    #[tracing::instrument(name = "Generating embedding", skip(self, text), fields(nb_chars = text.chars().count()))]
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbeddingsServiceError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingsServiceError::UnreachableService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsServiceError::RequestRejected(format!(
                "{}: {}",
                status, body
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingsServiceError::MissingEmbedding(e.to_string()))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                EmbeddingsServiceError::MissingEmbedding("empty data array".into())
            })?;

        // Every stored vector must have the same dimension as the index
        if embedding.len() != self.dimensions {
            return Err(EmbeddingsServiceError::MissingEmbedding(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
