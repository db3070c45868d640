//! MCP server exposing the guarded MSSQL query tool.

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

use crate::adapter::MssqlAdapter;
use crate::config::MssqlConfig;
use crate::policy;

/// Discovery metadata for the query tool.
pub fn metadata() -> ToolMetadata {
    ToolMetadata {
        name: "mssql_query",
        title: "MSSQL Query Tool",
        description: "Executes a single read-only SQL statement through the validated MSSQL adapter.",
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

/// MSSQL MCP Server
#[derive(Clone)]
pub struct MssqlMcpServer {
    adapter: Arc<ValidatedAdapter<MssqlAdapter>>,
    tool_router: ToolRouter<Self>,
}

impl MssqlMcpServer {
    /// Connects the base adapter and wraps it with the denylist guard.
    pub async fn connect() -> anyhow::Result<Self> {
        let config = MssqlConfig::load()?;
        let adapter = MssqlAdapter::connect(&config).await?;
        let validated = ValidatedAdapter::new(adapter, policy::validation_policy()?);
        Ok(Self {
            adapter: Arc::new(validated),
            tool_router: Self::tool_router(),
        })
    }
}

#[tool_router]
impl MssqlMcpServer {
    #[tool(
        description = "Execute a single read-only SQL statement against MSSQL. DDL, DML, transaction control, stored procedures, batch separators, and temporary tables are rejected before any connection is touched. Returns a correlation-tracked JSON envelope with at most maxRows rows."
    )]
    async fn mssql_query(
        &self,
        Parameters(request): Parameters<QueryRequest>,
    ) -> Result<CallToolResult, McpError> {
        tool_response(run_query(self.adapter.as_ref(), request).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for MssqlMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only MSSQL query MCP server. Use mssql_query with a database name \
                 and a single SELECT statement; denylisted statements are rejected before \
                 they ever reach the engine."
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
        assert_eq!(meta.name, "mssql_query");
        assert_eq!(meta.input_fields, ["database", "query", "maxRows"]);
        assert!(meta.output_fields.contains(&"correlationId"));
        assert!(meta.output_fields.contains(&"rowCount"));
    }
}
