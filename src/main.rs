//! Server binary.
//!
//! Serves every query file in a local repository as an HTTP operation.
//!
//! Usage:
//!   cargo run -- --queries-dir ./queries --host 0.0.0.0 --port 8088

use clap::Parser;
use querify::config::{Config, DEFAULT_ENDPOINT, NO_CREDENTIAL};
use querify::http::start_server;
use querify::loader::{FileLoader, LocalLoader};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "querify")]
#[command(about = "HTTP API server for SPARQL query templates", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8088")]
    port: u16,

    /// Directory holding the .rq/.sparql query files
    #[arg(short, long, default_value = "./queries")]
    queries_dir: PathBuf,

    /// Endpoint used when neither a decorator nor endpoint.txt names one
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Basic-auth user for the configured endpoint ("none" disables it)
    #[arg(long, default_value = NO_CREDENTIAL)]
    endpoint_user: String,

    /// Basic-auth password for the configured endpoint ("none" disables it)
    #[arg(long, default_value = NO_CREDENTIAL)]
    endpoint_password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║             querify SPARQL Query Templating Engine            ║");
    println!("║                      HTTP API Server                          ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    println!("Loading query repository from: {}", args.queries_dir.display());
    let loader = Arc::new(LocalLoader::new(&args.queries_dir));
    match loader.query_names() {
        Ok(names) => println!("  - {} query file(s) found", names.len()),
        Err(e) => eprintln!("  - warning: repository could not be listed ({})", e),
    }
    println!();

    let config = Config {
        default_endpoint: args.endpoint,
        endpoint_user: args.endpoint_user,
        endpoint_password: args.endpoint_password,
    };
    println!("Default endpoint: {}", config.default_endpoint);
    println!();

    let addr = format!("{}:{}", args.host, args.port);
    println!("Starting HTTP server...");
    println!();

    // Set up graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        println!();
        println!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        result = start_server(&addr, config, loader) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            println!("Server shut down gracefully");
        }
    }

    Ok(())
}
