use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipshare")]
#[command(author, version, about = "Upload, trim, merge, and share short video clips")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Probe a media file with ffprobe and show its duration and size
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Generate a random bearer token for API access
    GenerateToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn start_overrides_are_optional() {
        let cli = Cli::try_parse_from(["clipshare", "start"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Start {
                host: None,
                port: None
            }
        ));

        let cli = Cli::try_parse_from(["clipshare", "-v", "start", "--port", "8081"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Start { port: Some(8081), .. }));
    }

    #[test]
    fn probe_requires_file() {
        assert!(Cli::try_parse_from(["clipshare", "probe"]).is_err());
        let cli = Cli::try_parse_from(["clipshare", "probe", "a.mp4", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Probe { json: true, .. }));
    }
}
