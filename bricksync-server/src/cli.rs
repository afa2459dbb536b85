use bricksync_types::Domain;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bricksync",
    about = "Bricksync - keeps Rebrickable lists in step with a local inventory",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run one synchronization and print its report")]
    Sync {
        #[arg(help = "Domain to sync: sets, missing-parts or part-list")]
        domain: Domain,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Run scheduled synchronizations until interrupted")]
    Daemon {
        #[arg(long, help = "Ignore start offsets and run every domain right away")]
        now: bool,
    },

    #[command(subcommand, about = "View and modify configuration")]
    Config(ConfigCommands),

    #[command(about = "Show the last report of every domain")]
    Status {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Get a specific configuration value")]
    Get {
        #[arg(help = "Configuration key (e.g., 'remote.base_url', 'sets.list_name')")]
        key: String,
    },

    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key")]
        key: String,

        #[arg(help = "New value ('null' clears optional values)")]
        value: String,
    },
}
