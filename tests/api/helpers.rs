use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use product_vector_service::{
    domain::entities::product_point::{Embeddings, ProductMatch, ProductPoint},
    ports::{
        embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
        vector_index_repository::{VectorIndexError, VectorIndexRepository},
    },
    startup::run,
    telemetry::{get_tracing_subscriber, init_tracing_subscriber},
};

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

pub const FAKE_DIMENSIONS: usize = 64;

/// Deterministic embeddings built from character trigram counts.
///
/// Texts sharing words end up with close vectors, which is enough
/// nearest-neighbor behavior for the tests. Every vector has the same
/// length and an L2 norm of 1, matching the adapter contract.
pub struct FakeEmbeddingsService;

#[async_trait]
impl EmbeddingsService for FakeEmbeddingsService {
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbeddingsServiceError> {
        let mut vector = vec![0.0f32; FAKE_DIMENSIONS];

        let chars: Vec<char> = text.to_lowercase().chars().collect();
        for window in chars.windows(3) {
            let mut hash: u64 = 1469598103934665603;
            for c in window {
                hash ^= *c as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % FAKE_DIMENSIONS as u64) as usize] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }

        Ok(vector)
    }
}

/// In-memory stand-in for the external vector index: points keyed by chunk
/// id, cosine similarity on query
#[derive(Default)]
pub struct InMemoryVectorIndex {
    points: Mutex<HashMap<String, ProductPoint>>,
}

impl InMemoryVectorIndex {
    pub fn stored_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.points.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get(&self, chunk_id: &str) -> Option<ProductPoint> {
        self.points.lock().unwrap().get(chunk_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    /// Seeds a point directly, bypassing the upsert pipeline
    pub fn seed(&self, point: ProductPoint) {
        self.points.lock().unwrap().insert(point.id.clone(), point);
    }
}

#[async_trait]
impl VectorIndexRepository for InMemoryVectorIndex {
    async fn upsert(&self, point: ProductPoint) -> Result<(), VectorIndexError> {
        self.points.lock().unwrap().insert(point.id.clone(), point);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ProductMatch>, VectorIndexError> {
        let points = self.points.lock().unwrap();

        let mut matches: Vec<(String, ProductMatch)> = points
            .values()
            .map(|point| {
                let score: f32 = point
                    .vector
                    .iter()
                    .zip(vector.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                (
                    point.id.clone(),
                    ProductMatch {
                        score,
                        metadata: point.payload.clone(),
                    },
                )
            })
            .collect();

        // Descending score, chunk id as a deterministic tie-breaker
        matches.sort_by(|(id_a, a), (id_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        matches.truncate(top_k);

        Ok(matches.into_iter().map(|(_, m)| m).collect())
    }
}

pub struct TestApp {
    pub address: String,
    /// Direct handle on the fake index used to assert what got stored
    pub vector_index: Arc<InMemoryVectorIndex>,
    pub api_client: reqwest::Client,
}

/// A test API client / test suite
impl TestApp {
    pub async fn post_upsert(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/vector/upsert", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_query(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/vector/query", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_query_multiple(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/vector/query_multiple", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Launches the server as a background task, wired on an in-memory vector
/// index and deterministic fake embeddings: no network service is needed.
///
/// Each test gets its own empty index, so tests are isolated.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    // A random OS port: port 0 triggers an OS scan for an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let vector_index = Arc::new(InMemoryVectorIndex::default());

    let server = run(
        listener,
        Arc::new(FakeEmbeddingsService),
        vector_index.clone(),
    )
    .expect("Failed to build server");

    // Launches the application as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        vector_index,
        api_client: reqwest::Client::new(),
    }
}
