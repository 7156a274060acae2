//! CLI argument definitions for GameClub.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | List every item of a collection |
//! | `get` | Fetch one item by id |
//! | `create` | Create an item from a JSON document |
//! | `update` | Replace an item from a JSON document |
//! | `delete` | Delete an item by id |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--base-url` | `$GAMECLUB_API_URL` | API base address |
//! | `--max-attempts` | `$GAMECLUB_MAX_ATTEMPTS` or `3` | Attempts per call |
//! | `--backoff` | `$GAMECLUB_BACKOFF` or `linear` | `linear`, `fixed` or `exponential` |
//! | `--backoff-ms` | `$GAMECLUB_BACKOFF_MS` or `1000` | Backoff unit |
//! | `--timeout-ms` | `$GAMECLUB_TIMEOUT_MS` or `10000` | Per-request timeout |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Log pipeline records to stderr |
//!
//! # Examples
//!
//! ```bash
//! gameclub list games --pretty
//! gameclub get teams 4
//! gameclub create news --data '{"title":"Finals","body":"Saturday 6pm"}'
//! gameclub delete tournaments 2 --max-attempts 1
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use gameclub_core::BackoffKind;

/// GameClub - command-line client for the GameClub REST API.
#[derive(Debug, Parser)]
#[command(
    name = "gameclub",
    author,
    version,
    about = "Command-line client for the GameClub REST API"
)]
pub struct Cli {
    /// API base address; overrides GAMECLUB_API_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Total attempts per call, including the first one.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Backoff family between attempts: linear, fixed or exponential.
    #[arg(long, global = true)]
    pub backoff: Option<BackoffKind>,

    /// Backoff unit in milliseconds.
    #[arg(long, global = true)]
    pub backoff_ms: Option<u64>,

    /// Per-request transport timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Emit pipeline log records (debug level) to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// REST collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Games,
    Teams,
    Tournaments,
    News,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every item of a collection.
    List(ListArgs),

    /// Fetch one item by id.
    Get(ItemArgs),

    /// Create an item from a JSON document.
    Create(CreateArgs),

    /// Replace an item from a JSON document.
    Update(UpdateArgs),

    /// Delete an item by id.
    Delete(ItemArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub resource: ResourceKind,
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[arg(value_enum)]
    pub resource: ResourceKind,

    pub id: u64,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(value_enum)]
    pub resource: ResourceKind,

    /// JSON document describing the new item.
    #[arg(long)]
    pub data: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(value_enum)]
    pub resource: ResourceKind,

    pub id: u64,

    /// JSON document replacing the item.
    #[arg(long)]
    pub data: String,
}
