use serde::Serialize;

/// A product record submitted for ingestion.
///
/// Only exists as pipeline input: the durable artifact is the set of
/// chunk points stored in the vector index.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub base_cost: f64,
}

impl ProductRecord {
    /// The text that gets chunked and embedded for this record
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}

/// A (product name, quantity) pair submitted for batch price aggregation
#[derive(Debug, Clone)]
pub struct LineItem {
    pub product_name: String,
    pub quantity: f64,
}

/// A line item priced from the metadata of its best index match
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub cost: f64,
    pub base_cost: f64,
    pub subtotal: f64,
    pub subtotal_profit: f64,
}

/// Result of aggregating a batch of line items.
///
/// Every line item of the batch ends up either in `found` or in `not_found`,
/// except matches lacking a usable cost, which are skipped (see the
/// aggregation service).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    pub found: Vec<PricedLineItem>,
    pub not_found: Vec<String>,
    pub total: f64,
    pub total_profit: f64,
}
