//! Query guard core shared by the database MCP servers.
//!
//! This crate holds everything that runs before and after engine I/O:
//!
//! - **Policy**: declarative denylist/allowlist rulesets, compiled once at
//!   startup and immutable afterwards ([`policy`])
//! - **Guard**: lexical validation that rejects unsafe SQL before any
//!   connection is touched ([`guard`])
//! - **Pipeline**: the single-operation adapter seam and the validating
//!   decorator ([`adapter`])
//! - **Envelope**: correlation-tracked, timestamped responses ([`envelope`],
//!   [`types`])
//! - **Row limiter**: the bounded-result ceiling ([`limit`])
//!
//! Base adapters performing engine I/O live in the server crates. Everything
//! here is side-effect free and safe for unlimited concurrent reuse.

pub mod adapter;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod init;
pub mod limit;
pub mod policy;
pub mod stub;
pub mod types;

// Re-export commonly used items at crate root
pub use adapter::{QueryAdapter, ValidatedAdapter};
pub use envelope::{run_query, tool_response};
pub use error::{GuardError, GuardKind, PolicyError, QueryError};
pub use init::init_tracing;
pub use limit::{effective_limit, limit_rows, DEFAULT_ROW_LIMIT, MAX_ROW_LIMIT};
pub use policy::{PolicyBuilder, ValidationPolicy};
pub use stub::StubAdapter;
pub use types::{QueryRequest, QueryResponseEnvelope, Row, ToolMetadata};

// Re-export rmcp types the server crates need alongside the helpers
pub use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};

// Re-export async_trait for implementing QueryAdapter
pub use async_trait::async_trait;
