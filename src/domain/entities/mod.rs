pub mod product_point;
pub mod product_record;
