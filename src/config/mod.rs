//! Configuration: TOML settings for query compilation and definition caching.

mod settings;

pub use settings::{DefinitionSettings, QuerySettings, Settings, SettingsError};
