//! Environment source: REGWATCH__SECTION__KEY=value

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix shared by all configuration variables
pub const ENV_PREFIX: &str = "REGWATCH";

/// Add environment overrides, e.g. `REGWATCH__WATCH__PATH=/services`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
