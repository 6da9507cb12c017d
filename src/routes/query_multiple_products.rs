use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use tracing::info;

use crate::{
    domain::{
        entities::product_record::LineItem,
        services::aggregation::{AggregationEngine, AggregationError},
    },
    helper::error_chain_fmt,
};

#[derive(Debug, Deserialize)]
pub struct BodyData {
    productos: Vec<ProductLineDto>,
}

#[derive(Debug, Deserialize)]
pub struct ProductLineDto {
    #[serde(rename = "nombreProducto")]
    nombre_producto: String,
    cantidad: f64,
}

#[tracing::instrument(name = "Query multiple products handler", skip(aggregation_engine, body), fields(nb_items = body.productos.len()))]
pub async fn query_multiple_products(
    aggregation_engine: web::Data<AggregationEngine>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, QueryMultipleProductsError> {
    let items: Vec<LineItem> = body
        .into_inner()
        .productos
        .into_iter()
        .map(|dto| LineItem {
            product_name: dto.nombre_producto,
            quantity: dto.cantidad,
        })
        .collect();

    let summary = aggregation_engine.aggregate(&items).await?;

    info!(
        nb_found = summary.found.len(),
        nb_not_found = summary.not_found.len(),
        "Aggregation done"
    );

    Ok(HttpResponse::Ok().json(summary))
}

#[derive(thiserror::Error)]
pub enum QueryMultipleProductsError {
    #[error("Aggregating line items failed: {0}")]
    AggregationError(#[from] AggregationError),
}

impl std::fmt::Debug for QueryMultipleProductsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for QueryMultipleProductsError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryMultipleProductsError::AggregationError(AggregationError::ValidationError(_)) => {
                StatusCode::BAD_REQUEST
            }
            QueryMultipleProductsError::AggregationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
