//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Table Planner - inspect and maintain game table signups
#[derive(Parser, Debug)]
#[command(name = "table-planner")]
#[command(about = "Inspect and maintain game table signups", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the table partitions and config.json
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List active tables, sorted by schedule
    List {
        /// Only tables posted in this channel
        #[arg(long)]
        channel: Option<u64>,

        /// Only tables of this server
        #[arg(long)]
        guild: Option<u64>,
    },

    /// List the tables a user runs, plays in or waits for
    Mine {
        /// Platform id of the user
        #[arg(long)]
        user: u64,

        /// Limit to this server
        #[arg(long)]
        guild: Option<u64>,
    },

    /// Print one active table as JSON
    Show {
        /// Table id
        id: String,
    },

    /// Archive every table posted in a deleted channel
    ArchiveChannel {
        /// Platform id of the channel
        channel: u64,
    },

    /// Archive every table of a server the bot left
    ArchiveGuild {
        /// Platform id of the server
        guild: u64,
    },
}
