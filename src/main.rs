mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use cs_av::{FfprobeProber, Prober, ToolRegistry};
use cs_core::config::Config;
use rand::RngCore;
use tokio_util::sync::CancellationToken;

/// Bytes of entropy in a generated bearer token.
const TOKEN_BYTES: usize = 32;

/// File config, then environment, for every command.
fn resolve_config(config_path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(config_path);
    config.apply_env();
    config
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = resolve_config(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting clipshare");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    cs_server::start(config, CancellationToken::new()).await?;
    Ok(())
}

fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick levels from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipshare=trace,cs_server=debug,cs_pipeline=debug,cs_av=debug,cs_db=debug,tower_http=debug".to_string()
        } else {
            "clipshare=info,cs_server=info,cs_pipeline=info,cs_av=info,cs_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let config = resolve_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&config, &file, json))
        }
        Commands::CheckTools => {
            let config = resolve_config(cli.config.as_deref());
            check_tools(&config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::GenerateToken => {
            println!("{}", generate_token());
            Ok(())
        }
    }
}

async fn probe_file(config: &Config, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let tools = ToolRegistry::discover(&config.tools);
    let prober = FfprobeProber::from_registry(&tools)?;
    let info = prober.probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!(
        "Size: {} bytes ({} MB)",
        info.size_bytes,
        cs_core::to_mb(info.size_bytes)
    );
    println!("Duration: {:.3}s", info.duration_secs);

    let limits = &config.limits;
    if limits.duration_allowed(info.duration_secs) {
        println!(
            "Within upload bounds ({}-{}s)",
            limits.min_duration_secs, limits.max_duration_secs
        );
    } else {
        println!(
            "Outside upload bounds ({}-{}s); an upload would be rejected",
            limits.min_duration_secs, limits.max_duration_secs
        );
    }

    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in tools.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("ffmpeg and ffprobe are both required to start the server")
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let mut config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };
    config.apply_env();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Upload dir: {}", config.storage.upload_dir.display());
    println!(
        "  Limits: {} MB, {}-{}s",
        config.limits.max_size_mb, config.limits.min_duration_secs, config.limits.max_duration_secs
    );
    println!("  Share links: {}", config.share_url("<slug>"));
    println!("  Auth enabled: {}", config.auth.enabled);

    Ok(())
}

/// A random hex bearer token suitable for `AUTH_TOKEN`.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
