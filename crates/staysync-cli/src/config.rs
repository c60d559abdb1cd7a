//! CLI configuration.
//!
//! All settings live in a single `config.toml`, by default at
//! `~/.config/staysync/config.toml`:
//!
//! ```toml
//! database_path = "/var/lib/staysync/staysync.db"
//! default_room = "garden"
//! fetch_timeout_secs = 30
//!
//! [[feeds]]
//! source = "airbnb"
//! url = "https://www.airbnb.com/calendar/ical/123.ics"
//!
//! [[feeds]]
//! source = "booking_com"
//! url = "webcal://admin.booking.com/hotel/ical/456.ics"
//!
//! [room_mapping]
//! booking_com = "attic"
//!
//! [auth]
//! allowed_emails = ["owner@example.com"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use staysync_core::{BookingSource, RoomId};
use staysync_engine::{AllowListPolicy, RoomMapping};
use staysync_feeds::{FeedConfig, validate_feeds};

use crate::error::{CliError, CliResult};

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Configuration for the `staysync` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaysyncConfig {
    /// SQLite database file; defaults to the user data directory.
    pub database_path: Option<PathBuf>,

    /// Room that channel bookings occupy unless `room_mapping` says otherwise.
    pub default_room: Option<RoomId>,

    /// Per-feed fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Channel feeds, synced in this order.
    pub feeds: Vec<FeedConfig>,

    /// Channel to room overrides, keyed by source name.
    pub room_mapping: BTreeMap<String, RoomId>,

    pub auth: AuthSettings,
}

impl Default for StaysyncConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_room: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            feeds: Vec::new(),
            room_mapping: BTreeMap::new(),
            auth: AuthSettings::default(),
        }
    }
}

/// Who may operate the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub allowed_emails: Vec<String>,
}

impl StaysyncConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::config(format!("failed to parse config: {}", e)))
    }

    /// Serializes to pretty TOML.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("failed to serialize config: {}", e)))
    }

    /// Checks everything that would make a sync or query misbehave.
    pub fn validate(&self) -> CliResult<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(CliError::config("fetch_timeout_secs must be greater than zero"));
        }
        validate_feeds(&self.feeds).map_err(|e| CliError::config(e.to_string()))?;

        if let Some(room) = &self.default_room {
            if room.trim().is_empty() {
                return Err(CliError::config("default_room must not be blank"));
            }
        }
        for (name, room) in &self.room_mapping {
            let source: BookingSource = name
                .parse()
                .map_err(|e| CliError::config(format!("room_mapping: {}", e)))?;
            if !source.is_external() {
                return Err(CliError::config("room_mapping cannot map manual bookings"));
            }
            if room.trim().is_empty() {
                return Err(CliError::config(format!("room_mapping.{} must not be blank", source)));
            }
        }

        self.authorization_policy()?;
        Ok(())
    }

    /// The allow-list built from `[auth]`.
    pub fn authorization_policy(&self) -> CliResult<AllowListPolicy> {
        AllowListPolicy::new(&self.auth.allowed_emails)
            .map_err(|e| CliError::config(format!("auth.allowed_emails: {}", e)))
    }

    /// Builds the engine's room mapping. Unknown source names are skipped;
    /// [`validate`](Self::validate) reports them.
    pub fn room_mapping(&self) -> RoomMapping {
        self.room_mapping
            .iter()
            .filter_map(|(name, room)| Some((name.parse::<BookingSource>().ok()?, room)))
            .fold(
                RoomMapping::new(self.default_room.clone()),
                |mapping, (source, room)| mapping.with_source(source, room.clone()),
            )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolves a `--room` argument against `default_room`.
    pub fn resolve_room(&self, room: Option<&str>) -> CliResult<RoomId> {
        room.map(str::to_string)
            .or_else(|| self.default_room.clone())
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                CliError::invalid_argument("no --room given and no default_room configured")
            })
    }

    /// The effective database location.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("staysync.db"))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("staysync")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("staysync")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
database_path = "/tmp/staysync-test.db"
default_room = "garden"
fetch_timeout_secs = 10

[[feeds]]
source = "airbnb"
url = "https://www.airbnb.com/calendar/ical/123.ics"

[[feeds]]
source = "booking_com"
url = "webcal://admin.booking.com/hotel/ical/456.ics"

[room_mapping]
booking_com = "attic"

[auth]
allowed_emails = ["Owner@Example.com"]
"#;

    #[test]
    fn parses_full_config() {
        let config = StaysyncConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/staysync-test.db"));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[1].source, BookingSource::BookingCom);
        assert!(config.validate().is_ok());

        let mapping = config.room_mapping();
        assert_eq!(mapping.room_for(BookingSource::Airbnb).as_deref(), Some("garden"));
        assert_eq!(mapping.room_for(BookingSource::BookingCom).as_deref(), Some("attic"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = StaysyncConfig::parse("").unwrap();
        assert_eq!(config, StaysyncConfig::default());
        assert_eq!(config.fetch_timeout_secs, 30);
        assert!(config.validate().is_ok());
        assert!(config.database_path().ends_with("staysync/staysync.db"));
    }

    #[test]
    fn toml_round_trip() {
        let config = StaysyncConfig::parse(SAMPLE).unwrap();
        let reparsed = StaysyncConfig::parse(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cases = [
            ("fetch_timeout_secs = 0", "greater than zero"),
            (
                "[[feeds]]\nsource = \"manual\"\nurl = \"https://a.example/1.ics\"",
                "manual",
            ),
            (
                "[[feeds]]\nsource = \"vrbo\"\nurl = \"ftp://a.example/1.ics\"",
                "scheme",
            ),
            ("[room_mapping]\nmanual = \"garden\"", "manual"),
            ("[room_mapping]\nexpedia = \"garden\"", "unknown booking source"),
            ("[auth]\nallowed_emails = [\"nobody\"]", "allowed_emails"),
        ];
        for (toml, expected) in cases {
            let err = StaysyncConfig::parse(toml).unwrap().validate().unwrap_err();
            assert!(err.to_string().contains(expected), "{}: {}", toml, err);
        }
    }

    #[test]
    fn unknown_source_fails_to_parse() {
        let err = StaysyncConfig::parse("[[feeds]]\nsource = \"expedia\"\nurl = \"https://a.example\"")
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn resolve_room_prefers_argument() {
        let config = StaysyncConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.resolve_room(Some("attic")).unwrap(), "attic");
        assert_eq!(config.resolve_room(None).unwrap(), "garden");
        assert!(StaysyncConfig::default().resolve_room(None).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = StaysyncConfig::load_from(&path).unwrap();
        assert_eq!(config.default_room.as_deref(), Some("garden"));

        let missing = StaysyncConfig::load_from(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(CliError::Config(_))));
    }
}
