//! Config loader: assembles sources in precedence order and deserializes.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::RegwatchConfig;
use crate::error::WatchError;
use std::path::Path;

/// Loads [`RegwatchConfig`] from defaults, files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using the global config file and an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<RegwatchConfig, WatchError> {
        let global = global_file::global_config_path();
        Self::load_layers(global.as_deref(), explicit)
    }

    /// Load from a single file plus defaults and environment, skipping the
    /// global file.
    pub fn load_from_file(path: &Path) -> Result<RegwatchConfig, WatchError> {
        Self::load_layers(None, Some(path))
    }

    /// Load with explicit layer paths.
    ///
    /// Precedence (lowest to highest): defaults, global file, explicit file,
    /// environment.
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<RegwatchConfig, WatchError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder, global)?;
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: RegwatchConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
