//! Collaborator-facing entry points.
//!
//! Every mutation runs one load → mutate → save cycle inside a store
//! transaction on the blocking thread pool, so concurrent commands against
//! the same table serialize on the partition locks instead of racing.

use crate::names::{DisplayNameCache, NameResolver};
use crate::query::{ListingLayout, TableFilter, TableRow, project, render_listing, select_involving};
use crate::PlannerConfig;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use table_planner_core::{
    ArchiveReason, ChannelId, EditOutcome, GuildId, JoinOutcome, LeaveOutcome, MessageId,
    TableFields, TableId, TableRecord, UserId,
};
use table_planner_error::{
    PlannerResult, RateLimitedError, StorageError, StorageErrorKind, TableError, TableErrorKind,
};
use table_planner_rate_limit::{Admission, ChannelCooldown, CommandRateLimiter, RateLimitScope};
use table_planner_storage::{FileRecordStore, Partition, Partitions, RecordStore};
use tracing::{debug, info, instrument};

/// The table-state engine.
///
/// Owns the record store plus the process-scoped state around it: rate-limit
/// windows, listing cooldowns and the display name cache. Authority checks
/// (may this user moderate this channel?) are resolved by the caller and
/// passed in as booleans.
pub struct TableEngine<S: RecordStore = FileRecordStore> {
    store: Arc<S>,
    config: PlannerConfig,
    limiter: CommandRateLimiter,
    cooldown: ChannelCooldown,
    names: DisplayNameCache,
    resolver: Option<Arc<dyn NameResolver>>,
}

impl TableEngine<FileRecordStore> {
    /// Open the file-backed engine rooted at `data_dir`, loading its config.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the data directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> PlannerResult<Self> {
        let data_dir = data_dir.as_ref();
        let config = PlannerConfig::load(data_dir);
        let store = FileRecordStore::new(data_dir)?;
        Ok(Self::new(store, config))
    }
}

impl<S: RecordStore> TableEngine<S> {
    /// Create an engine over `store` with the given settings.
    pub fn new(store: S, config: PlannerConfig) -> Self {
        Self {
            store: Arc::new(store),
            limiter: CommandRateLimiter::new(config.rate_limits),
            cooldown: ChannelCooldown::new(config.rate_limits.list_cooldown_seconds),
            names: DisplayNameCache::default(),
            resolver: None,
            config,
        }
    }

    /// Resolve creator names through `resolver` when projecting rows.
    pub fn with_name_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the display name cache, e.g. to change the lookup timeout.
    pub fn with_name_cache(mut self, names: DisplayNameCache) -> Self {
        self.names = names;
        self
    }

    /// Settings in force.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `work` against the store on the blocking thread pool.
    async fn blocking<R, F>(&self, work: F) -> PlannerResult<R>
    where
        F: FnOnce(&S) -> PlannerResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || work(store.as_ref()))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable(format!(
                    "Storage task failed: {}",
                    e
                )))
            })?
    }

    async fn transact<R, F>(&self, mutate: F) -> PlannerResult<R>
    where
        F: FnOnce(&mut Partitions) -> PlannerResult<R> + Send + 'static,
        R: Send + 'static,
    {
        self.blocking(move |store| store.transaction(mutate)).await
    }

    async fn active_snapshot(&self) -> PlannerResult<Partition> {
        self.blocking(|store| Ok(store.load_active())).await
    }

    /// Create and store a new table owned by `creator`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the table cannot be saved.
    #[instrument(skip(self, table_fields), fields(creator = %creator, guild = %guild))]
    pub async fn create(
        &self,
        table_fields: TableFields,
        creator: UserId,
        guild: GuildId,
    ) -> PlannerResult<TableRecord> {
        let now = Utc::now();
        let record = self
            .transact(move |partitions| {
                let mut record = TableRecord::create(table_fields.clone(), creator, guild, now);
                while partitions.active.contains_key(record.id())
                    || partitions.archived.contains_key(record.id())
                {
                    record = TableRecord::create(table_fields.clone(), creator, guild, now);
                }
                partitions.active.insert(*record.id(), record.clone());
                Ok(record)
            })
            .await?;
        info!(table = %record.id(), capacity = *record.capacity(), "Table created");
        Ok(record)
    }

    /// Sign `user` up for `table`.
    ///
    /// # Errors
    ///
    /// `AlreadyInTable`, `NotFound`, or a storage error.
    #[instrument(skip(self, display_name), fields(table = %table, user = %user))]
    pub async fn join(
        &self,
        table: TableId,
        user: UserId,
        display_name: Option<String>,
    ) -> PlannerResult<JoinOutcome> {
        let now = Utc::now();
        let outcome = self
            .transact(move |partitions| partitions.active_mut(&table)?.join(user, display_name, now))
            .await?;
        match outcome {
            JoinOutcome::Seated => info!("User seated"),
            JoinOutcome::Waitlisted { position } => info!(position, "User waitlisted"),
        }
        Ok(outcome)
    }

    /// Remove `user` from `table`, promoting the first waitlisted user into a
    /// freed seat.
    ///
    /// # Errors
    ///
    /// `NotInTable`, `NotFound`, or a storage error.
    #[instrument(skip(self), fields(table = %table, user = %user))]
    pub async fn leave(&self, table: TableId, user: UserId) -> PlannerResult<LeaveOutcome> {
        let outcome = self
            .transact(move |partitions| partitions.active_mut(&table)?.leave(user))
            .await?;
        info!(left = %outcome.left, "User left");
        if let Some(promoted) = &outcome.promoted {
            info!(promoted = %promoted.user_id(), "Promoted from waitlist");
        }
        Ok(outcome)
    }

    /// Replace the editable fields of `table` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless `actor` is the creator or `can_moderate`;
    /// `NotFound`, or a storage error.
    #[instrument(skip(self, table_fields), fields(table = %table, actor = %actor))]
    pub async fn edit(
        &self,
        table: TableId,
        actor: UserId,
        can_moderate: bool,
        table_fields: TableFields,
    ) -> PlannerResult<EditOutcome> {
        let outcome = self
            .transact(move |partitions| {
                let record = partitions.active_mut(&table)?;
                record.authorize(actor, can_moderate, "edit")?;
                record.edit(table_fields)
            })
            .await?;
        if !outcome.demoted.is_empty() {
            info!(demoted = outcome.demoted.len(), "Capacity reduced; players moved to waitlist");
        }
        Ok(outcome)
    }

    /// Archive `table` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless `actor` is the creator or `can_moderate`;
    /// `NotFound` if the table is unknown or already archived.
    #[instrument(skip(self), fields(table = %table, actor = %actor))]
    pub async fn archive(
        &self,
        table: TableId,
        actor: UserId,
        can_moderate: bool,
    ) -> PlannerResult<ArchiveReason> {
        let now = Utc::now();
        let reason = self
            .transact(move |partitions| {
                let reason = partitions
                    .active_mut(&table)?
                    .archive(actor, can_moderate, now)?;
                partitions.move_to_archive(&table)?;
                Ok(reason)
            })
            .await?;
        info!(%reason, "Table archived");
        Ok(reason)
    }

    /// Snapshot of one active table.
    ///
    /// # Errors
    ///
    /// `NotFound` if the table is unknown or archived.
    #[instrument(skip(self))]
    pub async fn get(&self, table: TableId) -> PlannerResult<TableRecord> {
        self.active_snapshot()
            .await?
            .remove(&table)
            .ok_or_else(|| TableError::new(TableErrorKind::NotFound(table.to_string())).into())
    }

    /// Remember where the signup card of `table` was posted.
    ///
    /// # Errors
    ///
    /// `NotFound` if the table is unknown or archived, or a storage error.
    #[instrument(skip(self))]
    pub async fn record_posting(
        &self,
        table: TableId,
        channel: ChannelId,
        message: MessageId,
    ) -> PlannerResult<()> {
        self.transact(move |partitions| {
            partitions
                .active_mut(&table)?
                .record_posting(channel, message)
        })
        .await?;
        debug!("Posting location recorded");
        Ok(())
    }

    /// Rows for every active table matching `filter`, sorted by schedule.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot task fails.
    #[instrument(skip(self))]
    pub async fn list_active(&self, filter: TableFilter) -> PlannerResult<Vec<TableRow>> {
        let active = self.active_snapshot().await?;
        let mut rows = project(active.values(), &filter);
        self.resolve_names(&mut rows).await;
        debug!(rows = rows.len(), "Listed active tables");
        Ok(rows)
    }

    /// Rows for every active table `user` created, sits at or waits for.
    ///
    /// # Errors
    ///
    /// `ValidationError` on `guild` when no server was given and the tables
    /// span several servers.
    #[instrument(skip(self))]
    pub async fn list_involving(
        &self,
        user: UserId,
        guild: Option<GuildId>,
    ) -> PlannerResult<Vec<TableRow>> {
        let active = self.active_snapshot().await?;
        let mut rows = select_involving(active.values(), user, guild)?;
        self.resolve_names(&mut rows).await;
        Ok(rows)
    }

    /// Render rows with the configured column widths for `layout`.
    pub fn render(&self, rows: &[TableRow], layout: ListingLayout) -> String {
        let widths = match layout {
            ListingLayout::Channel => &self.config.list_tables,
            ListingLayout::Personal => &self.config.my_tables,
        };
        render_listing(rows, widths, layout)
    }

    async fn resolve_names(&self, rows: &mut [TableRow]) {
        let Some(resolver) = &self.resolver else {
            return;
        };
        for row in rows.iter_mut() {
            row.gm = self
                .names
                .resolve(resolver.as_ref(), row.guild_id, row.creator_id, &row.gm)
                .await;
        }
    }

    /// Admit one command against the `scope` window of `key`.
    ///
    /// # Errors
    ///
    /// `RateLimitedError` when the window is full.
    pub async fn check_rate_limit(&self, scope: RateLimitScope, key: u64) -> PlannerResult<()> {
        self.limiter.check(scope, key, Utc::now()).await
    }

    /// Admit one command from `user`, counting against `guild` too when the
    /// command ran in a server.
    ///
    /// # Errors
    ///
    /// `RateLimitedError` for the first exhausted window.
    pub async fn check_command(&self, user: UserId, guild: Option<GuildId>) -> PlannerResult<()> {
        self.limiter
            .check_command(user.0, guild.map(|guild| guild.0), Utc::now())
            .await
    }

    /// Whether `channel` may post a public listing now.
    ///
    /// # Errors
    ///
    /// `RateLimitedError` with scope `channel` while the cooldown runs.
    pub async fn check_listing_cooldown(&self, channel: ChannelId) -> PlannerResult<()> {
        match self.cooldown.check(channel.0, Utc::now()).await {
            Admission::Allowed => Ok(()),
            Admission::Denied { wait_seconds } => {
                info!(%channel, wait_seconds, "Listing throttled");
                Err(RateLimitedError::new("channel", channel.0, wait_seconds).into())
            }
        }
    }

    /// Start the listing cooldown for `channel` after a successful post.
    pub async fn record_listing(&self, channel: ChannelId) {
        self.cooldown.record(channel.0, Utc::now()).await;
    }

    /// Archive every listed table with `reason`, skipping unknown ids.
    ///
    /// Returns how many tables moved.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    #[instrument(skip(self, tables), fields(count = tables.len()))]
    pub async fn archive_tables(
        &self,
        tables: Vec<TableId>,
        reason: ArchiveReason,
    ) -> PlannerResult<usize> {
        let now = Utc::now();
        let moved = self
            .blocking(move |store| store.archive_tables(&tables, reason, now))
            .await?;
        info!(moved, "Tables archived in bulk");
        Ok(moved)
    }

    /// Archive tables the bot can no longer reach.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    pub async fn archive_inaccessible(&self, tables: Vec<TableId>) -> PlannerResult<usize> {
        self.archive_tables(tables, ArchiveReason::NoAccess).await
    }

    /// Archive every active table posted in `channel`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    pub async fn archive_channel(&self, channel: ChannelId) -> PlannerResult<usize> {
        self.archive_matching(TableFilter::all().in_channel(channel))
            .await
    }

    /// Archive every active table of `guild`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    pub async fn archive_guild(&self, guild: GuildId) -> PlannerResult<usize> {
        self.archive_matching(TableFilter::all().in_guild(guild)).await
    }

    #[instrument(skip(self))]
    async fn archive_matching(&self, filter: TableFilter) -> PlannerResult<usize> {
        let now = Utc::now();
        let moved = self
            .blocking(move |store| {
                store.archive_where(
                    |record| filter.matches(record),
                    ArchiveReason::RemovedFromServer,
                    now,
                )
            })
            .await?;
        info!(moved, "Tables archived after losing their location");
        Ok(moved)
    }
}
