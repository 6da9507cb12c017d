pub mod openai_embeddings_repository;
pub mod product_point_qdrant_repository;
