use std::collections::BTreeMap;

use crate::{logging::LoggingConfig, surface::TextSurface};

// NOTE: plugin configuration keys, everything else is a clock attribute
const SELECTABLE: &str = "selectable";
const STORE_PATH: &str = "store_path";
const LOG_FILTER: &str = "log_filter";

pub const DEFAULT_STORE_PATH: &str = "/data/worldclock.json";

#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    pub selectable: bool,
    pub store_path: String,
    pub log_filter: Option<String>,
    /// Declarative attributes applied to every clock surface.
    pub attributes: BTreeMap<String, String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            selectable: false,
            store_path: DEFAULT_STORE_PATH.to_string(),
            log_filter: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl PluginConfig {
    pub fn from_map(mut configuration: BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = configuration.remove(SELECTABLE) {
            config.selectable = value.parse().unwrap_or(false);
        }
        if let Some(value) = configuration.remove(STORE_PATH) {
            config.store_path = value;
        }
        config.log_filter = configuration.remove(LOG_FILTER);
        config.attributes = configuration;
        config
    }

    /// Hands out fresh clock surfaces carrying the configured attributes.
    pub fn surfaces(&self) -> impl FnMut(&str) -> TextSurface + 'static {
        let attributes = self.attributes.clone();
        move |_: &str| {
            attributes
                .iter()
                .fold(TextSurface::new(), |surface, (name, value)| surface.with_attribute(name, value))
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log_filter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = PluginConfig::from_map(BTreeMap::new());
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.store_path, DEFAULT_STORE_PATH);
    }

    #[test]
    fn splits_plugin_keys_from_clock_attributes() {
        let config = PluginConfig::from_map(map(&[
            ("selectable", "true"),
            ("store_path", "/tmp/zones.json"),
            ("log_filter", "worldclock=debug"),
            ("use12HourFormat", "true"),
            ("showSeconds", "true"),
        ]));
        assert!(config.selectable);
        assert_eq!(config.store_path, "/tmp/zones.json");
        assert_eq!(config.logging().env_filter.as_deref(), Some("worldclock=debug"));
        assert_eq!(
            config.attributes,
            map(&[("showSeconds", "true"), ("use12HourFormat", "true")])
        );
    }

    #[test]
    fn surfaces_carry_attributes() {
        use crate::surface::Surface;

        let config = PluginConfig::from_map(map(&[("showSeconds", "true")]));
        let mut surfaces = config.surfaces();
        let first = surfaces("Asia/Tokyo");
        let second = surfaces("Europe/Dublin");
        assert_eq!(first.attribute("showSeconds").as_deref(), Some("true"));
        assert_eq!(second.attribute("showSeconds").as_deref(), Some("true"));
        assert_eq!(first.attribute("timezone"), None);
    }

    #[test]
    fn unparsable_selectable_is_false() {
        let config = PluginConfig::from_map(map(&[("selectable", "yes")]));
        assert!(!config.selectable);
    }
}
