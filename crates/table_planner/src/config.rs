//! Configuration loading.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `<config dir>/table_planner/config.json`
//! 3. `<data dir>/config.json`
//! 4. environment variables such as `TABLE_PLANNER__RATE_LIMITS__USER_COMMAND_LIMIT`
//!
//! # Example
//!
//! ```json
//! {
//!   "list_tables": { "column_widths": { "system": 16, "gm": 12 } },
//!   "rate_limits": { "user_command_limit": 5, "list_cooldown_seconds": 30 }
//! }
//! ```
//!
//! Every field is optional. A source that cannot be parsed is skipped with a
//! warning, and a value that is not a positive integer is ignored for that
//! field only.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use table_planner_rate_limit::{RateLimitSettings, WindowLimit};
use tracing::{debug, instrument, warn};

/// File name of the configuration document.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TABLE_PLANNER";

/// Column widths of one listing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWidths {
    /// Game system column
    pub system: usize,
    /// Schedule column
    pub schedule: usize,
    /// Game master column
    pub gm: usize,
    /// Seat summary column
    pub players: usize,
    /// Involvement column, only shown in the personal listing
    pub status: usize,
}

impl ColumnWidths {
    /// Defaults for the public channel listing.
    pub const LIST_TABLES: Self = Self {
        system: 20,
        schedule: 24,
        gm: 24,
        players: 10,
        status: 10,
    };

    /// Defaults for the personal listing.
    pub const MY_TABLES: Self = Self::LIST_TABLES;

    fn overlay(mut self, widths: Option<&Map<String, Value>>) -> Self {
        let Some(widths) = widths else {
            return self;
        };
        for (key, slot) in [
            ("system", &mut self.system),
            ("schedule", &mut self.schedule),
            ("gm", &mut self.gm),
            ("players", &mut self.players),
            ("status", &mut self.status),
        ] {
            if let Some(width) = positive(widths, key) {
                *slot = usize::try_from(width).unwrap_or(*slot);
            }
        }
        self
    }
}

/// Effective settings after every source was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Layout of the public channel listing
    pub list_tables: ColumnWidths,
    /// Layout of the personal listing
    pub my_tables: ColumnWidths,
    /// Admission control limits
    pub rate_limits: RateLimitSettings,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            list_tables: ColumnWidths::LIST_TABLES,
            my_tables: ColumnWidths::MY_TABLES,
            rate_limits: RateLimitSettings::default(),
        }
    }
}

impl PlannerConfig {
    /// Load from the user config directory, `data_dir` and the environment.
    ///
    /// Never fails; unreadable sources fall back to defaults.
    #[instrument(skip(data_dir), fields(dir = %data_dir.as_ref().display()))]
    pub fn load(data_dir: impl AsRef<Path>) -> Self {
        let mut files = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            files.push(config_dir.join("table_planner").join(CONFIG_FILE_NAME));
        }
        files.push(data_dir.as_ref().join(CONFIG_FILE_NAME));
        Self::from_sources(&files, true)
    }

    /// Load from `files` in increasing precedence, optionally followed by the
    /// environment.
    pub fn from_sources(files: &[PathBuf], use_env: bool) -> Self {
        let mut builder = Config::builder();

        for path in files {
            if !path.exists() {
                continue;
            }
            // Probe alone so one broken file does not discard the others.
            let probe = Config::builder()
                .add_source(File::from(path.as_path()).format(FileFormat::Json))
                .build();
            match probe {
                Ok(_) => {
                    debug!(path = %path.display(), "Using config file");
                    builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Json));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                }
            }
        }

        if use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let document = builder
            .build()
            .and_then(|config| config.try_deserialize::<Value>());
        match document {
            Ok(document) => Self::from_value(&document),
            Err(e) => {
                warn!(error = %e, "Could not assemble configuration; using defaults");
                Self::default()
            }
        }
    }

    /// Apply one parsed document over the defaults, field by field.
    pub fn from_value(document: &Value) -> Self {
        let mut config = Self::default();
        let Some(root) = document.as_object() else {
            warn!("Configuration is not an object; using defaults");
            return config;
        };

        config.list_tables = config
            .list_tables
            .overlay(column_widths(root, "list_tables"));
        config.my_tables = config.my_tables.overlay(column_widths(root, "my_tables"));

        if let Some(limits) = root.get("rate_limits").and_then(Value::as_object) {
            let settings = &mut config.rate_limits;
            settings.user = window(limits, "user", settings.user);
            settings.guild = window(limits, "guild", settings.guild);
            if let Some(seconds) = positive(limits, "list_cooldown_seconds") {
                settings.list_cooldown_seconds = seconds;
            }
        }

        debug!(?config, "Configuration resolved");
        config
    }
}

fn column_widths<'a>(root: &'a Map<String, Value>, profile: &str) -> Option<&'a Map<String, Value>> {
    root.get(profile)?
        .as_object()?
        .get("column_widths")?
        .as_object()
}

fn window(limits: &Map<String, Value>, scope: &str, current: WindowLimit) -> WindowLimit {
    let max_count = positive(limits, &format!("{scope}_command_limit"))
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(current.max_count);
    let window_seconds =
        positive(limits, &format!("{scope}_command_window_seconds")).unwrap_or(current.window_seconds);
    WindowLimit::new(max_count, window_seconds)
}

/// A strictly positive integer at `key`; anything else is ignored.
fn positive(map: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = map.get(key)?;
    match value.as_u64() {
        Some(number) if number > 0 => Some(number),
        _ => {
            warn!(key, %value, "Ignoring config value that is not a positive integer");
            None
        }
    }
}
