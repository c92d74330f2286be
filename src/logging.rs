use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax, e.g. "info" or
/// "worldclock=debug".
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        // stderr ends up in the zellij log when running as a plugin
        builder.target(env_logger::Target::Stderr);
        let _ = builder.try_init();
    });
}
