//! Command handlers.

use super::Commands;
use table_planner::{
    ChannelId, GuildId, JsonError, ListingLayout, PlannerResult, TableEngine, TableFilter,
    TableId, UserId, ValidationError,
};

/// Run one CLI command against `engine`.
pub async fn handle_command(engine: &TableEngine, command: Commands) -> PlannerResult<()> {
    match command {
        Commands::List { channel, guild } => {
            let mut filter = TableFilter::all();
            if let Some(channel) = channel {
                filter = filter.in_channel(ChannelId(channel));
            }
            if let Some(guild) = guild {
                filter = filter.in_guild(GuildId(guild));
            }
            let rows = engine.list_active(filter).await?;
            if rows.is_empty() {
                println!("There are no active tables in this context.");
            } else {
                println!("{}", engine.render(&rows, ListingLayout::Channel));
            }
        }

        Commands::Mine { user, guild } => {
            let rows = engine
                .list_involving(UserId(user), guild.map(GuildId))
                .await?;
            if rows.is_empty() {
                println!("Not currently running or signed up for any tables.");
            } else {
                println!("{}", engine.render(&rows, ListingLayout::Personal));
            }
        }

        Commands::Show { id } => {
            let table: TableId = id
                .trim()
                .parse()
                .map_err(|_| ValidationError::new("table", "not a valid table id"))?;
            let record = engine.get(table).await?;
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| JsonError::new(e.to_string()))?;
            println!("{}", json);
        }

        Commands::ArchiveChannel { channel } => {
            let moved = engine.archive_channel(ChannelId(channel)).await?;
            println!("Archived {} table(s) from channel {}.", moved, channel);
        }

        Commands::ArchiveGuild { guild } => {
            let moved = engine.archive_guild(GuildId(guild)).await?;
            println!("Archived {} table(s) from server {}.", moved, guild);
        }
    }

    Ok(())
}
