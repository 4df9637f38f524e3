//! Read-only projections of active tables for listing views.
//!
//! Everything here works on a snapshot and never mutates records. Rows are
//! ordered by the raw `schedule` text; no attempt is made to parse it as a
//! time.

use crate::ColumnWidths;
use std::collections::BTreeSet;
use table_planner_core::{ChannelId, GuildId, Involvement, TableId, TableRecord, UserId};
use table_planner_error::{PlannerResult, ValidationError};

/// Narrowest column a listing will render.
pub const MIN_COLUMN_WIDTH: usize = 4;

/// Criteria a table must meet to be listed. Unset criteria match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Posted in this channel
    pub channel: Option<ChannelId>,
    /// Belongs to this server
    pub guild: Option<GuildId>,
    /// Created by this user
    pub creator: Option<UserId>,
    /// Created by, seating or queueing this user
    pub involving: Option<UserId>,
}

impl TableFilter {
    /// Match every active table.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to tables posted in `channel`.
    pub fn in_channel(mut self, channel: ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Restrict to tables of `guild`.
    pub fn in_guild(mut self, guild: GuildId) -> Self {
        self.guild = Some(guild);
        self
    }

    /// Restrict to tables created by `creator`.
    pub fn created_by(mut self, creator: UserId) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Restrict to tables `user` is involved in.
    pub fn involving(mut self, user: UserId) -> Self {
        self.involving = Some(user);
        self
    }

    /// Whether `record` meets every set criterion.
    pub fn matches(&self, record: &TableRecord) -> bool {
        let location = record.location();
        self.channel
            .is_none_or(|channel| *location.channel_id() == Some(channel))
            && self.guild.is_none_or(|guild| *location.guild_id() == guild)
            && self.creator.is_none_or(|creator| *record.creator_id() == creator)
            && self
                .involving
                .is_none_or(|user| record.involvement(user).is_some())
    }
}

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Table the row describes
    pub id: TableId,
    /// Game system
    pub system: String,
    /// Free-text schedule, also the sort key
    pub schedule: String,
    /// Creator of the table
    pub creator_id: UserId,
    /// Label shown for the creator
    pub gm: String,
    /// Seat summary such as `3/5 (+2)`
    pub seats: String,
    /// Server the table belongs to
    pub guild_id: GuildId,
    /// Channel the card was posted in, if posted
    pub channel_id: Option<ChannelId>,
    /// How the viewing user relates to the table, for personal listings
    pub involvement: Option<Involvement>,
}

impl TableRow {
    /// Project `record` as seen by `viewer`.
    ///
    /// The creator label starts as their cached seat label when they also
    /// hold a seat, otherwise their id; live resolution may replace it.
    pub fn from_record(record: &TableRecord, viewer: Option<UserId>) -> Self {
        let creator = *record.creator_id();
        let gm = record
            .roster()
            .iter()
            .chain(record.waitlist())
            .find(|entry| *entry.user_id() == creator)
            .map(|entry| entry.label())
            .unwrap_or_else(|| creator.to_string());

        Self {
            id: *record.id(),
            system: record.system().clone(),
            schedule: record.schedule().clone(),
            creator_id: creator,
            gm,
            seats: record.seat_summary(),
            guild_id: *record.location().guild_id(),
            channel_id: *record.location().channel_id(),
            involvement: viewer.and_then(|user| record.involvement(user)),
        }
    }
}

/// Rows for every record matching `filter`, sorted by schedule.
pub fn project<'a>(
    records: impl IntoIterator<Item = &'a TableRecord>,
    filter: &TableFilter,
) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = records
        .into_iter()
        .filter(|record| filter.matches(record))
        .map(|record| TableRow::from_record(record, filter.involving))
        .collect();
    rows.sort_by(|a, b| a.schedule.cmp(&b.schedule));
    rows
}

/// Rows for every table `user` is involved in.
///
/// With a `guild` the rows are limited to that server. Without one (a direct
/// message) the rows must all come from a single server.
///
/// # Errors
///
/// `ValidationError` on field `guild` when no server was given and the
/// user's tables span several servers.
pub fn select_involving<'a>(
    records: impl IntoIterator<Item = &'a TableRecord>,
    user: UserId,
    guild: Option<GuildId>,
) -> PlannerResult<Vec<TableRow>> {
    let mut filter = TableFilter::all().involving(user);
    if let Some(guild) = guild {
        filter = filter.in_guild(guild);
    }
    let rows = project(records, &filter);

    if guild.is_none() {
        let guilds: BTreeSet<GuildId> = rows.iter().map(|row| row.guild_id).collect();
        if guilds.len() > 1 {
            return Err(ValidationError::new(
                "guild",
                "you have tables on multiple servers; run this in the server you want to see",
            )
            .into());
        }
    }
    Ok(rows)
}

/// Which columns a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ListingLayout {
    /// System, schedule, GM, players
    Channel,
    /// The channel columns plus the viewer's involvement
    Personal,
}

/// Fit `value` into exactly `width` characters.
///
/// Short values are left-aligned and padded. Long values are cut to
/// `width - 3` characters followed by `...`, or hard-cut when `width <= 3`.
pub fn format_cell(value: &str, width: usize) -> String {
    let length = value.chars().count();
    if length <= width {
        return format!("{value:<width$}");
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }
    let kept: String = value.chars().take(width - 3).collect();
    format!("{kept}...")
}

/// Render `rows` as a fixed-width text table with a header and a rule line.
pub fn render_listing(rows: &[TableRow], widths: &ColumnWidths, layout: ListingLayout) -> String {
    let system = widths.system.max(MIN_COLUMN_WIDTH);
    let schedule = widths.schedule.max(MIN_COLUMN_WIDTH);
    let gm = widths.gm.max(MIN_COLUMN_WIDTH);
    let players = widths.players.max(MIN_COLUMN_WIDTH);
    let status = widths.status.max(MIN_COLUMN_WIDTH);

    let mut header = format!(
        "{:<system$} {:<schedule$} {:<gm$} {:<players$}",
        "System", "Schedule", "GM", "Players"
    );
    if layout == ListingLayout::Personal {
        header.push_str(&format!(" {:<status$}", "Status"));
    }

    let rule = "-".repeat(header.chars().count());
    let mut lines = vec![header, rule];

    for row in rows {
        let mut line = format!(
            "{} {} {} {}",
            format_cell(&row.system, system),
            format_cell(&row.schedule, schedule),
            format_cell(&row.gm, gm),
            format_cell(&row.seats, players),
        );
        if layout == ListingLayout::Personal {
            let involvement = row
                .involvement
                .map(|involvement| involvement.to_string())
                .unwrap_or_default();
            line.push(' ');
            line.push_str(&format_cell(&involvement, status));
        }
        lines.push(line);
    }
    lines.join("\n")
}
