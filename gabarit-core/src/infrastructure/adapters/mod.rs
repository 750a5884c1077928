// gabarit-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod geodatabase;

pub use duckdb::DuckDbStore;
pub use geodatabase::DuckDbGeodatabase;
