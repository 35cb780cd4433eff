//! Start command - launches the Reprise server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;

use reprise_config::{ConfigSource, LoadedConfig, RepriseConfig};
use reprise_server::{Server, ServerConfig};
use reprise_session::{MemorySessionStore, SessionConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Config file to use instead of discovery
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let loaded = match &args.config {
        Some(path) => LoadedConfig {
            config: reprise_config::load_config_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            sources: vec![ConfigSource {
                path: path.clone(),
                loaded: true,
            }],
            warnings: Vec::new(),
        },
        None => reprise_config::load_config(None)?,
    };

    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }

    if ctx.verbose {
        for path in loaded.loaded_from() {
            eprintln!("config: {}", path.display());
        }
    }

    let mut resolved = RepriseConfig::with_defaults();
    resolved.merge(loaded.config);

    let server_config = server_config(&resolved, &args)?;
    let session_config = session_config(&resolved);

    let store = MemorySessionStore::new(session_config);
    let _cleanup = store.spawn_cleanup_task();

    tracing::info!(
        bind = %server_config.bind_address,
        expiration = %server_config.stash_expiration,
        "Starting Reprise server"
    );

    Server::new(Arc::new(store), server_config).run().await?;
    Ok(())
}

/// Runtime server settings from config plus CLI overrides.
fn server_config(config: &RepriseConfig, args: &StartArgs) -> Result<ServerConfig> {
    let mut server = config.server();
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(bind) = &args.bind {
        server.bind = bind.clone();
    }

    let addr: SocketAddr = server.socket_addr()?;

    Ok(ServerConfig::new()
        .with_bind_address(addr)
        .with_cookie_name(server.cookie_name)
        .with_secure_cookie(server.secure_cookie)
        .with_request_logging(server.request_logging)
        .with_stash_expiration(config.stash().expiration))
}

/// Session store settings from config.
fn session_config(config: &RepriseConfig) -> SessionConfig {
    let session = config.session();
    SessionConfig::new()
        .with_max_sessions(session.max_sessions)
        .with_cleanup_task(session.cleanup_interval_secs > 0)
        .with_cleanup_interval(Duration::from_secs(session.cleanup_interval_secs.max(1)))
        .with_site(session.site)
}
