//! Table Planner CLI binary.
//!
//! Operator access to the table store:
//! - List active tables, globally or per channel/server
//! - Show one table, or a user's tables
//! - Archive tables whose channel or server is gone

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    table_planner::init_tracing(cli.verbose)?;

    let engine = table_planner::TableEngine::open(&cli.data_dir)?;
    if let Err(e) = handle_command(&engine, cli.command).await {
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }

    Ok(())
}
