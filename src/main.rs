//! GPT Image MCP Server
//!
//! MCP server for image generation and editing using the OpenAI Images API.

use anyhow::Result;
use clap::Parser;
use gpt_image_mcp::{Config, ImageCardServer, TransportArgs, serve};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the image card server.
#[derive(Parser, Debug)]
#[command(name = "gpt-image-mcp")]
#[command(about = "MCP server for image generation and editing using the OpenAI Images API")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("gpt-image-mcp server starting...");

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        api_key_set = config.api_key.is_some(),
        api_base = %config.api_base,
        quality = %config.quality,
        resolution = %config.resolution,
        background = %config.background,
        "Configuration loaded"
    );

    // Create the server handler
    let server = ImageCardServer::new(config);

    // Run the MCP server
    serve(server, args.transport.into_transport()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
