pub mod health_check;
pub mod query_multiple_products;
pub mod query_products;
pub mod upsert_product;

pub use health_check::health_check;
pub use query_multiple_products::query_multiple_products;
pub use query_products::query_products;
pub use upsert_product::upsert_product;
