//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key, so a file that only sets
/// `watch.path` keeps every other default.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("store.host", "localhost")?
        .set_default("store.port", 4001)?
        .set_default("store.protocol", "http")?
        .set_default("watch.path", "/")?
        .set_default("watch.recursive", true)?
        .set_default("watch.reconnect", true)?
        .set_default("watch.stable", true)
}
