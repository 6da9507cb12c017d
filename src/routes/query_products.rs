use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use tracing::info;

use crate::{
    domain::services::query_pipeline::{QueryPipeline, QueryPipelineError, DEFAULT_TOP_K},
    helper::error_chain_fmt,
};

#[derive(Debug, Deserialize)]
pub struct BodyData {
    #[serde(rename = "queryText")]
    query_text: String,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

#[tracing::instrument(name = "Query products handler", skip(query_pipeline))]
pub async fn query_products(
    query_pipeline: web::Data<QueryPipeline>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, QueryProductsError> {
    let body = body.into_inner();

    if body.query_text.is_empty() {
        return Err(QueryProductsError::ValidationError(
            "`queryText` is required".into(),
        ));
    }
    let top_k = body.top_k.unwrap_or(DEFAULT_TOP_K);

    let matches = query_pipeline.query(&body.query_text, top_k).await?;

    info!(nb_matches = matches.len(), "Query done");

    Ok(HttpResponse::Ok().json(matches))
}

#[derive(thiserror::Error)]
pub enum QueryProductsError {
    #[error("Invalid input: {0}")]
    ValidationError(String),
    #[error("Querying products failed: {0}")]
    QueryPipelineError(#[from] QueryPipelineError),
}

impl std::fmt::Debug for QueryProductsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for QueryProductsError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryProductsError::ValidationError(_) => StatusCode::BAD_REQUEST,
            QueryProductsError::QueryPipelineError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
