//! Clap derive structures for the `homgar` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homgar -- read HomGar / RainPoint irrigation sensors from the cloud
#[derive(Debug, Parser)]
#[command(
    name = "homgar",
    version,
    about = "Read HomGar / RainPoint irrigation sensors from the command line",
    long_about = "Lists the homes, hubs and sensors registered to a HomGar account\n\
        and shows their current readings. The session token is cached between\n\
        runs so the account is not logged in again on every invocation.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "HOMGAR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Standalone account file (YAML or TOML) instead of the profile config
    #[arg(long, short = 'c', env = "HOMGAR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account e-mail (overrides profile)
    #[arg(long, short = 'e', env = "HOMGAR_EMAIL", global = true, hide_env = true)]
    pub email: Option<String>,

    /// Token cache file (overrides profile)
    #[arg(long, env = "HOMGAR_CACHE", global = true)]
    pub cache: Option<PathBuf>,

    /// Keep the token in memory only
    #[arg(long, global = true, conflicts_with = "cache")]
    pub no_cache: bool,

    /// Cloud endpoint (overrides profile)
    #[arg(long, env = "HOMGAR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOMGAR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HOMGAR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the homes of the account
    Homes,

    /// List hubs and sensors per home
    #[command(alias = "dev", alias = "d")]
    Devices(HomeFilterArgs),

    /// Show current sensor readings
    #[command(alias = "st", alias = "s")]
    Status(StatusArgs),

    /// Log in and cache the session token
    Login(LoginArgs),

    /// Drop the cached session token
    Logout,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Args ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HomeFilterArgs {
    /// Only this home (by id)
    #[arg(long = "home", short = 'H')]
    pub home: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub filter: HomeFilterArgs,

    /// Hide values that could not be decoded
    #[arg(long)]
    pub hide_unknown: bool,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Store the password in the system keyring for this profile
    #[arg(long)]
    pub remember: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
