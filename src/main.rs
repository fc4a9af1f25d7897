// src/main.rs

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use chain_rpc_mcp::{
    api::create_app,
    config::{Config, ServerKind},
    mcp::{
        handler::handle_mcp_request,
        protocol::{Request, Response},
    },
    AppState,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = create_app(state);

    info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("HTTP server failed")
}

// --- MCP Server Logic ---
// Each request runs on its own task so a slow node does not block others
// (or the cancellation notice aimed at it). Responses go through one writer.
async fn run_mcp_server(state: AppState) -> Result<()> {
    info!("Starting MCP server on stdin/stdout...");

    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(response) = rx.recv().await {
            let response_json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to encode response: {}", e);
                    continue;
                }
            };
            debug!("Sending: {}", response_json);
            let written = async {
                stdout.write_all(response_json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await
            };
            if let Err(e) = written.await {
                error!("Failed to write response: {}", e);
                break;
            }
        }
    });

    let mut lines = io::BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        match Request::parse(line) {
            Ok(request) => {
                let state = state.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = handle_mcp_request(request, state).await {
                        let _ = tx.send(response);
                    }
                });
            }
            Err(rejection) => {
                error!("Rejected frame: {:?}", rejection.error);
                let _ = tx.send(rejection);
            }
        }
    }

    // The writer drains once every in-flight task has dropped its sender.
    drop(tx);
    writer.await.context("response writer panicked")?;
    info!("MCP server shutting down");
    Ok(())
}

/// `--server <kind>` wins over `MCP_SERVER`.
fn server_flag(args: &[String]) -> Result<Option<ServerKind>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--server=") {
            return value.parse().map(Some);
        }
        if arg == "--server" {
            let value = iter.next().context("--server needs a value: evm, solana or pumpfun")?;
            return value.parse().map(Some);
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the stdio protocol.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chain_rpc_mcp=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(server) = server_flag(&args)? {
        config.server = server;
    }
    info!(server = %config.server, "configuration loaded");

    let app_state = AppState::from_config(config)?;

    if args.iter().any(|a| a == "--mcp") || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await
    } else {
        run_http_server(app_state).await
    }
}
