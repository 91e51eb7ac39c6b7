//! Subcommand implementations

pub mod migrate;
pub mod serve;

use clap::Args;
use itemctl_server::db::DEFAULT_DATABASE_URL;

/// Database connection arguments shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (falls back to the local development default)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(long, default_value_t = itemctl_server::db::pool::DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}
