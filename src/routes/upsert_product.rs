use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    domain::{
        entities::product_record::ProductRecord,
        services::upsert_pipeline::{UpsertPipeline, UpsertPipelineError, DEFAULT_CHUNK_SIZE},
    },
    helper::error_chain_fmt,
};

/// Wire names kept from the first deployment of this service
#[derive(Debug, Deserialize)]
pub struct BodyData {
    id: String,
    nombre: String,
    descripcion: String,
    costo: f64,
    #[serde(rename = "precioBase")]
    precio_base: f64,
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
}

#[tracing::instrument(name = "Upsert product handler", skip(upsert_pipeline, body), fields(record_id = %body.id))]
pub async fn upsert_product(
    upsert_pipeline: web::Data<UpsertPipeline>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, UpsertProductError> {
    let body = body.into_inner();

    // Fails fast, before any remote call
    if body.id.is_empty() {
        return Err(UpsertProductError::ValidationError("`id` is required".into()));
    }
    if body.nombre.is_empty() {
        return Err(UpsertProductError::ValidationError(
            "`nombre` is required".into(),
        ));
    }
    if body.descripcion.is_empty() {
        return Err(UpsertProductError::ValidationError(
            "`descripcion` is required".into(),
        ));
    }
    if body.costo == 0.0 || !body.costo.is_finite() {
        return Err(UpsertProductError::ValidationError(
            "`costo` must be a non-zero number".into(),
        ));
    }
    if body.precio_base == 0.0 || !body.precio_base.is_finite() {
        return Err(UpsertProductError::ValidationError(
            "`precioBase` must be a non-zero number".into(),
        ));
    }
    let chunk_size = body.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
    if chunk_size == 0 {
        return Err(UpsertProductError::ValidationError(
            "`chunkSize` must be a positive integer".into(),
        ));
    }

    let record = ProductRecord {
        id: body.id,
        name: body.nombre,
        description: body.descripcion,
        cost: body.costo,
        base_cost: body.precio_base,
    };

    let report = upsert_pipeline.upsert(&record, chunk_size).await?;

    info!(
        chunks_upserted = report.chunks_upserted,
        "Product record upserted"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Vectors created and upserted successfully",
        "chunksUpserted": report.chunks_upserted,
    })))
}

#[derive(thiserror::Error)]
pub enum UpsertProductError {
    #[error("Invalid input: {0}")]
    ValidationError(String),
    // The pipeline error spells out how many chunks were already written,
    // so a partial write is never hidden behind a generic failure
    #[error("Upserting the product record failed: {0}")]
    UpsertPipelineError(#[from] UpsertPipelineError),
}

impl std::fmt::Debug for UpsertProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for UpsertProductError {
    fn status_code(&self) -> StatusCode {
        match self {
            UpsertProductError::ValidationError(_) => StatusCode::BAD_REQUEST,
            UpsertProductError::UpsertPipelineError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
