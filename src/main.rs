//! malsaem-mcp: MCP server for the Urimalsaem (우리말샘) Korean dictionary
//!
//! Serves the `search_word` tool over stdio for local MCP clients, or over
//! HTTP for remote ones.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use malsaem_mcp::config::{self, ApiKey, Config};
use malsaem_mcp::dictionary::DictionaryClient;
use malsaem_mcp::error::ConfigError;
use malsaem_mcp::http::{self, AppState};
use malsaem_mcp::mcp::McpServer;

/// MCP server for the Urimalsaem Korean dictionary.
///
/// Exposes a `search_word` tool backed by the Urimalsaem open API. The API
/// key is read from MALSAEM_API_KEY (or a `.env` file) unless given on the
/// command line.
#[derive(Parser, Debug)]
#[command(name = "malsaem-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Transport to serve
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Urimalsaem open API key
    #[arg(long, env = config::API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Bind address for the HTTP transports (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Listen port for the HTTP transports (overrides the config file)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

/// Where MCP messages come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// MCP over HTTP on /mcp
    Http,
    /// /search and /mcp endpoints for edge hosting
    Edge,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays reserved for MCP messages.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the malsaem-mcp server.
fn main() -> ExitCode {
    // Before parsing, so MALSAEM_API_KEY and PORT can come from .env
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nExpected config at: {}", default_path.display());
                    eprintln!("Create one based on config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(host) = args.host.clone() {
        cfg.http.host = host;
    }
    if let Some(port) = args.port {
        cfg.http.port = port;
    }

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?args.transport,
        "Starting malsaem-mcp server"
    );

    let api_key = config::resolve_api_key(args.api_key.as_deref());

    match args.transport {
        Transport::Stdio => run_stdio(&cfg, api_key),
        Transport::Http => run_http(&cfg, api_key, http::server::router),
        Transport::Edge => run_http(&cfg, api_key, http::edge::router),
    }
}

/// The stdio transport cannot start without a key.
fn require_api_key(api_key: Option<ApiKey>) -> Result<ApiKey, ConfigError> {
    api_key.ok_or(ConfigError::MissingApiKey)
}

/// Serves MCP on stdin/stdout. A missing API key is fatal here.
fn run_stdio(cfg: &Config, api_key: Option<ApiKey>) -> ExitCode {
    let api_key = match require_api_key(api_key) {
        Ok(api_key) => api_key,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match DictionaryClient::from_config(&cfg.api, api_key) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let mut server = McpServer::new(client);

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    finish(runtime.block_on(server.run()))
}

/// Serves one of the HTTP routers. A missing API key only fails requests.
fn run_http(
    cfg: &Config,
    api_key: Option<ApiKey>,
    router: fn(AppState) -> axum::Router,
) -> ExitCode {
    if api_key.is_none() {
        tracing::warn!("{}; search requests will fail", ConfigError::MissingApiKey);
    }

    let state = match AppState::new(&cfg.api, api_key) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    finish(runtime.block_on(http::serve(router(state), &cfg.http)))
}

fn finish(result: std::io::Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn transport_defaults_to_stdio() {
        let args = Args::try_parse_from(["malsaem-mcp"]).unwrap();
        assert_eq!(args.transport, Transport::Stdio);
        assert!(args.config.is_none());
    }

    #[test]
    fn parses_http_options() {
        let args = Args::try_parse_from([
            "malsaem-mcp",
            "--transport",
            "edge",
            "--host",
            "0.0.0.0",
            "--port",
            "8787",
            "-vv",
            "custom.json",
        ])
        .unwrap();
        assert_eq!(args.transport, Transport::Edge);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8787));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("custom.json")));
    }

    #[test]
    fn stdio_requires_api_key() {
        let err = require_api_key(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains(config::API_KEY_ENV));

        let key = require_api_key(Some(ApiKey::new("secret").unwrap())).unwrap();
        assert_eq!(key.expose(), "secret");
    }

    #[test]
    fn missing_key_exits_with_failure() {
        let code = run_stdio(&Config::default(), None);
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "nonsense"), Level::WARN);
        assert_eq!(get_log_level(1, false, "error"), Level::INFO);
        assert_eq!(get_log_level(5, false, "warn"), Level::TRACE);
    }
}
