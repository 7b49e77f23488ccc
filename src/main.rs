/// Main entry point for the n8n documentation MCP server
///
/// This file sets up logging, parses command line arguments, and starts the
/// HTTP server. MCP clients send JSON-RPC requests to `POST /mcp`.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use n8n_docs_mcp::{Cli, DocsMcpServer, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "n8n_docs_mcp={level},tower_http={level}",
            level = cli.log_level()
        ))
        .with_writer(std::io::stderr) // Keep stdout free for tooling output
        .init();

    match run(cli).await {
        Ok(()) => {
            info!("n8n documentation MCP server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server stopped with an error");
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    info!("Starting n8n documentation MCP server in HTTP mode");

    let config = ServerConfig::from_cli(cli)?;
    let server = DocsMcpServer::new(config).await?;
    server.run().await
}
