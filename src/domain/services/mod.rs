pub mod aggregation;
pub mod chunking;
pub mod query_pipeline;
pub mod upsert_pipeline;
