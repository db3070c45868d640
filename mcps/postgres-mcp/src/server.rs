//! MCP server exposing the guarded Postgres metadata query tool.

use std::sync::Arc;

use query_core::{
    run_query, tool_response, CallToolResult, McpError, QueryRequest, ToolMetadata,
    ValidatedAdapter,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::adapter::PostgresAdapter;
use crate::config::PostgresConfig;
use crate::policy;

/// Discovery metadata for the query tool.
pub fn metadata() -> ToolMetadata {
    ToolMetadata {
        name: "pg_metadata_query",
        title: "PostgreSQL Metadata Query Tool",
        description: "Executes read-only PostgreSQL catalog queries through the scoped metadata adapter.",
        input_fields: &["database", "query", "maxRows"],
        output_fields: &[
            "correlationId",
            "database",
            "queryResult",
            "rowCount",
            "startedAt",
            "completedAt",
        ],
    }
}

/// Postgres metadata MCP Server
#[derive(Clone)]
pub struct PostgresMcpServer {
    adapter: Arc<ValidatedAdapter<PostgresAdapter>>,
    tool_router: ToolRouter<Self>,
}

impl PostgresMcpServer {
    /// Connects the base adapter and wraps it with the scoped denylist guard.
    pub fn connect() -> anyhow::Result<Self> {
        let config = PostgresConfig::load()?;
        let adapter = PostgresAdapter::connect(&config)?;
        let validated = ValidatedAdapter::new(adapter, policy::validation_policy()?);
        Ok(Self {
            adapter: Arc::new(validated),
            tool_router: Self::tool_router(),
        })
    }
}

#[tool_router]
impl PostgresMcpServer {
    #[tool(
        description = "Execute a single read-only SQL statement against the PostgreSQL system catalogs. The query must reference pg_catalog/information_schema objects; DDL, DML, transaction control, COPY, and maintenance statements are rejected before any connection is touched. Returns a correlation-tracked JSON envelope with at most maxRows rows."
    )]
    async fn pg_metadata_query(
        &self,
        Parameters(request): Parameters<QueryRequest>,
    ) -> Result<CallToolResult, McpError> {
        tool_response(run_query(self.adapter.as_ref(), request).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for PostgresMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PostgreSQL metadata query MCP server. Use pg_metadata_query with a \
                 database name and a single SELECT over pg_catalog or \
                 information_schema; anything else is rejected before it reaches the \
                 engine."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lists_the_wire_fields() {
        let meta = metadata();
        assert_eq!(meta.name, "pg_metadata_query");
        assert_eq!(meta.input_fields, ["database", "query", "maxRows"]);
        assert!(meta.output_fields.contains(&"correlationId"));
    }
}
