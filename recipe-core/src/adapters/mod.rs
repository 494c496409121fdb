//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Repository port
//! - In-process collections for the Repository port (tests, scratch use)

pub mod duckdb;
pub mod memory;
