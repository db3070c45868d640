//! MSSQL query MCP library.
//!
//! One tool, `mssql_query`: a single read-only SQL statement runs through the
//! denylist guard, then the tiberius base adapter, and comes back as a
//! correlation-tracked envelope. Rejected statements never reach the engine.

pub mod adapter;
pub mod config;
pub mod policy;
pub mod server;

// Re-export main server type
pub use server::MssqlMcpServer;
