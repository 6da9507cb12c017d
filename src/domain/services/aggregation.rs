use tracing::warn;

use crate::{
    domain::{
        entities::product_record::{AggregationSummary, LineItem, PricedLineItem},
        services::query_pipeline::{QueryPipeline, QueryPipelineError},
    },
    helper::error_chain_fmt,
};

/// Turns a batch of (product name, quantity) line items into a priced summary
/// by looking up each item's best match in the vector index.
#[derive(Clone)]
pub struct AggregationEngine {
    query_pipeline: QueryPipeline,
}

impl AggregationEngine {
    pub fn new(query_pipeline: QueryPipeline) -> Self {
        Self { query_pipeline }
    }

    /// Aggregates `items` in input order.
    ///
    /// The whole batch is validated before any remote call is made: one
    /// invalid item fails the call without touching the embeddings or index
    /// services. A lookup failure also aborts the whole batch: no partial
    /// summary is ever returned.
    ///
    /// An item whose best match lacks a usable numeric cost ends up in
    /// neither `found` nor `not_found`. That asymmetry is inherited from the
    /// first deployments of this service and is kept as-is until the intended
    /// behavior is confirmed.
    #[tracing::instrument(name = "Aggregating line items", skip(self, items), fields(nb_items = items.len()))]
    pub async fn aggregate(
        &self,
        items: &[LineItem],
    ) -> Result<AggregationSummary, AggregationError> {
        // All-or-nothing validation pass, before any remote call
        for (position, item) in items.iter().enumerate() {
            if item.product_name.trim().is_empty() {
                return Err(AggregationError::ValidationError(format!(
                    "Line item {} has an empty product name",
                    position + 1
                )));
            }
            if !item.quantity.is_finite() {
                return Err(AggregationError::ValidationError(format!(
                    "Line item {} ({}) has a non-numeric quantity",
                    position + 1,
                    item.product_name
                )));
            }
        }

        let mut found = Vec::new();
        let mut not_found = Vec::new();
        let mut total = 0.0;
        let mut total_profit = 0.0;

        for item in items {
            let matches = self.query_pipeline.query(&item.product_name, 1).await?;

            let Some(best_match) = matches.first() else {
                not_found.push(item.product_name.clone());
                continue;
            };

            let metadata = &best_match.metadata;
            let Some(cost) = metadata.cost.filter(|c| c.is_finite()) else {
                // Matched but unpriceable: belongs to neither partition
                warn!(
                    product_name = %item.product_name,
                    matched_id = %metadata.id,
                    "Skipping line item: its match carries no usable cost"
                );
                continue;
            };

            let base_cost = metadata.base_cost.unwrap_or(0.0);
            let subtotal = cost * item.quantity;
            let subtotal_profit = (cost - base_cost) * item.quantity;

            total += subtotal;
            total_profit += subtotal_profit;
            found.push(PricedLineItem {
                id: metadata.id.clone(),
                name: metadata.name.clone(),
                quantity: item.quantity,
                cost,
                base_cost,
                subtotal,
                subtotal_profit,
            });
        }

        Ok(AggregationSummary {
            found,
            not_found,
            total,
            total_profit,
        })
    }
}

#[derive(thiserror::Error)]
pub enum AggregationError {
    #[error("Invalid line item: {0}")]
    ValidationError(String),
    #[error("Looking up a line item failed: {0}")]
    QueryPipelineError(#[from] QueryPipelineError),
}

impl std::fmt::Debug for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
