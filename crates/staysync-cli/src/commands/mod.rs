//! Command implementations.
//!
//! Each command returns the text to print so it can be tested without
//! capturing stdout.

pub mod availability;
pub mod config;
pub mod reservations;
pub mod sync;

use serde::Serialize;
use staysync_engine::{AvailabilityReconciler, Store};

use crate::config::StaysyncConfig;
use crate::error::CliResult;

/// Shared state for commands that touch the store.
pub struct Context {
    pub config: StaysyncConfig,
    pub store: Store,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl Context {
    /// Validates `config` and opens its database.
    pub async fn open(config: StaysyncConfig, json: bool) -> CliResult<Self> {
        config.validate()?;
        let store = Store::open(config.database_path()).await?;
        Ok(Self {
            config,
            store,
            json,
        })
    }

    pub fn reconciler(&self) -> AvailabilityReconciler {
        AvailabilityReconciler::new(self.store.clone(), self.config.room_mapping())
    }

    /// Renders `value` as pretty JSON or through `text`.
    pub fn output<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> CliResult<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(text(value))
        }
    }
}
