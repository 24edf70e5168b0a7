//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate), and their associated argument
//! structs. Every flag has an environment variable equivalent for
//! container deployments; the env names match the original deployment
//! conventions (`SERVICES_CONFIG_PATH`, `GLOBAL_POLL_INTERVAL`, ...).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "wakeward",
    version,
    about = "Wake-on-LAN HTTP reverse proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        wakeward init                        Create a starter config\n  \
        wakeward run                         Start with ./wakeward.yaml\n  \
        wakeward run -c services.yaml        Start with a specific config"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Generate a starter config file
    Init(InitArgs),

    /// Validate a config file without starting
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        wakeward run                                       Auto-detect config\n  \
        wakeward run -c services.yaml                      Specific config file\n  \
        wakeward run -c services.yaml -p 8080 --pretty     Local dev mode\n  \
        wakeward run --max-retries 20 --poll-interval 2    Patient wake loop")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "SERVICES_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Wake defaults --
    // When unset, the config file's `defaults` section (or 5s/10/5s/5s)
    // applies; an explicit flag or env var beats the file.
    /// Default seconds to wait between a wake packet and the next probe [default: 5]
    #[arg(long, env = "GLOBAL_POLL_INTERVAL", help_heading = "Wake Defaults")]
    pub poll_interval: Option<u64>,

    /// Default number of wake+probe cycles after the initial probe [default: 10]
    #[arg(long, env = "GLOBAL_MAX_RETRIES", help_heading = "Wake Defaults")]
    pub max_retries: Option<u32>,

    /// Default timeout in seconds for the forwarded request (connect + first response) [default: 5]
    #[arg(long, env = "GLOBAL_REQUEST_TIMEOUT", help_heading = "Wake Defaults")]
    pub forward_timeout: Option<u64>,

    /// Default timeout in seconds for each health probe [default: 5]
    #[arg(long, env = "GLOBAL_AWAKE_REQUEST_TIMEOUT", help_heading = "Wake Defaults")]
    pub probe_timeout: Option<u64>,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        wakeward init                          Starter config (yaml)\n  \
        wakeward init -f toml -o config.toml   TOML format")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "wakeward.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
