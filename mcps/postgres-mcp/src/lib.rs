//! PostgreSQL metadata query MCP library.
//!
//! One tool, `pg_metadata_query`: a single read-only statement that must
//! reference the system catalogs (`pg_catalog`, `information_schema`, ...)
//! runs through the scope allowlist and denylist guard, then the
//! tokio-postgres base adapter, and comes back as a correlation-tracked
//! envelope.

pub mod adapter;
pub mod config;
pub mod policy;
pub mod server;

// Re-export main server type
pub use server::PostgresMcpServer;
