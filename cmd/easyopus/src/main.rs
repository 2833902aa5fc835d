//! easyopus CLI - encode and decode raw PCM with libopus.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{DecodeCommand, EncodeCommand, RoundtripCommand};
use config::Mode;

/// easyopus CLI - encode and decode raw PCM with libopus.
///
/// PCM files are headerless interleaved 16-bit little-endian samples.
/// Encoded files hold one packet per record, each prefixed by its
/// length as a 16-bit little-endian integer.
///
/// Codec settings come from ~/.easyopus/config.yaml when present;
/// flags override the file.
#[derive(Parser)]
#[command(name = "easyopus")]
#[command(about = "Opus codec CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.easyopus/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Sample rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<i32>,

    /// Channel count (1 or 2)
    #[arg(long, global = true)]
    pub channels: Option<i32>,

    /// Application mode
    #[arg(long, global = true, value_enum)]
    pub application: Option<Mode>,

    /// Target bitrate in bits per second
    #[arg(long, global = true)]
    pub bitrate: Option<i32>,

    /// Encoder complexity (0-10)
    #[arg(long, global = true)]
    pub complexity: Option<i32>,

    /// Frame duration in milliseconds (2.5, 5, 10, 20, 40, 60, 80, 100, 120)
    #[arg(long, global = true)]
    pub frame_ms: Option<f32>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode then decode PCM frame by frame
    Roundtrip(RoundtripCommand),
    /// Encode PCM to length-prefixed packets
    Encode(EncodeCommand),
    /// Decode length-prefixed packets to PCM
    Decode(DecodeCommand),
    /// Print the effective codec profile
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Roundtrip(cmd) => cmd.run(&cli),
        Commands::Encode(cmd) => cmd.run(&cli),
        Commands::Decode(cmd) => cmd.run(&cli),
        Commands::Config => commands::show_config(&cli),
    }
}
