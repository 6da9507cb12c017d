use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{QdrantSettings, Settings},
    domain::services::{
        aggregation::AggregationEngine, query_pipeline::QueryPipeline,
        upsert_pipeline::UpsertPipeline,
    },
    ports::{embeddings_service::EmbeddingsService, vector_index_repository::VectorIndexRepository},
    repositories::{
        openai_embeddings_repository::OpenAiEmbeddingsRepository,
        product_point_qdrant_repository::{
            ProductPointQdrantRepository, ProductPointQdrantRepositoryError,
        },
    },
    routes::{health_check, query_multiple_products, query_products, upsert_product},
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
    #[error(transparent)]
    ProductPointQdrantRepositoryError(#[from] ProductPointQdrantRepositoryError),
}

impl Application {
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(settings: Settings) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        let vector_index = ProductPointQdrantRepository::try_new(
            qdrant_client,
            &settings.qdrant.collection,
            &settings.qdrant.collection_distance,
            settings.qdrant.collection_vector_size,
        )
        .await?;
        let vector_index: Arc<dyn VectorIndexRepository> = Arc::new(vector_index);

        let embeddings_service: Arc<dyn EmbeddingsService> =
            Arc::new(OpenAiEmbeddingsRepository::new(&settings.embeddings));

        let server = run(listener, embeddings_service, vector_index)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// The pipelines are built here from the injected adapters, so integration
/// tests can run the exact same server against in-process fakes.
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index: Arc<dyn VectorIndexRepository>,
) -> Result<Server, std::io::Error> {
    let upsert_pipeline = UpsertPipeline::new(embeddings_service.clone(), vector_index.clone());
    let query_pipeline = QueryPipeline::new(embeddings_service, vector_index);
    let aggregation_engine = AggregationEngine::new(query_pipeline.clone());

    // Wraps the pipelines in `actix_web::Data` (`Arc`) to register them
    // and access them from handlers. They are shared among all workers.
    let upsert_pipeline = Data::new(upsert_pipeline);
    let query_pipeline = Data::new(query_pipeline);
    let aggregation_engine = Data::new(aggregation_engine);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/api/vector/upsert", web::post().to(upsert_product))
            .route("/api/vector/query", web::post().to(query_products))
            .route(
                "/api/vector/query_multiple",
                web::post().to(query_multiple_products),
            )
            .app_data(upsert_pipeline.clone())
            .app_data(query_pipeline.clone())
            .app_data(aggregation_engine.clone())
    })
    .listen(listener)?;

    // No await
    Ok(server.run())
}

/// Sets up a client to Qdrant
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationBuildError> {
    let qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    QdrantClient::new(Some(qdrant_config)).map_err(|e| ApplicationBuildError::QdrantError(e.to_string()))
}
