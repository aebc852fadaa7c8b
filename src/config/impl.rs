use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Initialize the global configuration
///
/// Loads `path` (or `config.toml` when `None`) plus `TL__*` environment
/// overrides. Only the first call has any effect.
///
/// # Examples
/// ```no_run
/// use tracklink::config::init_config;
/// init_config(Some("tracklink.toml"));
/// ```
pub fn init_config(path: Option<&str>) -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| {
            Arc::new(StaticConfig::load(
                path.unwrap_or(super::DEFAULT_CONFIG_PATH),
            ))
        })
        .clone()
}
