//! Postgres metadata query MCP binary.
//!
//! `serve` (default) runs the MCP server over stdio; `invoke` runs the query
//! tool once from the command line; `describe` prints tool metadata without
//! executing anything.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;

use postgres_mcp::adapter::PostgresAdapter;
use postgres_mcp::config::PostgresConfig;
use postgres_mcp::policy::validation_policy;
use postgres_mcp::server::{metadata, PostgresMcpServer};
use query_core::{run_query, QueryRequest, StubAdapter, ValidatedAdapter};

#[derive(Parser)]
#[command(name = "postgres-mcp")]
#[command(about = "Guarded PostgreSQL metadata query tool, served over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the MCP server over stdio (default)
    Serve,
    /// Invoke the query tool once and print the response envelope
    Invoke {
        /// Logical database/catalog name to target
        #[arg(long)]
        database: String,
        /// Single read-only SQL statement over the system catalogs
        #[arg(long)]
        query: String,
        /// Optional cap on returned rows
        #[arg(long)]
        max_rows: Option<u32>,
        /// Use the deterministic stub adapter instead of a live connection
        #[arg(long)]
        stub: bool,
    },
    /// Print tool metadata without executing anything
    Describe,
}

#[tokio::main]
async fn main() -> Result<()> {
    query_core::init_tracing("postgres_mcp")?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Invoke {
            database,
            query,
            max_rows,
            stub,
        } => {
            invoke(
                QueryRequest {
                    database,
                    query,
                    max_rows,
                },
                stub,
            )
            .await
        }
        Commands::Describe => {
            println!("{}", serde_json::to_string_pretty(&metadata())?);
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    tracing::info!("Starting postgres-mcp server");
    let server = PostgresMcpServer::connect()?;
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;
    tracing::info!("Server shutting down");
    Ok(())
}

async fn invoke(request: QueryRequest, stub: bool) -> Result<()> {
    let policy = validation_policy()?;

    let result = if stub {
        let adapter = ValidatedAdapter::new(StubAdapter::with_rows(5), policy);
        run_query(&adapter, request).await
    } else {
        let config = PostgresConfig::load()?;
        let adapter = ValidatedAdapter::new(PostgresAdapter::connect(&config)?, policy);
        run_query(&adapter, request).await
    };

    match result {
        Ok(envelope) => {
            println!("{}", envelope.to_text()?);
            Ok(())
        }
        Err(error) => {
            eprintln!("Tool execution failed: {error}");
            std::process::exit(1);
        }
    }
}
