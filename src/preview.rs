//! Outside zellij: print the configured clocks once.
//!
//! Arguments are `key=value` pairs using the plugin configuration keys, plus
//! `fix=<zone>@<HH:MM[:SS]>` to preview a conversion. Bare arguments are zone
//! names shown in addition to the stored ones. Without `store_path` nothing is
//! persisted.

use std::{collections::BTreeMap, rc::Rc};

use log::error;
use worldclock::{
    config::PluginConfig,
    logging::init_logging,
    registry::ClockRegistry,
    store::{JsonFileStore, MemoryStore, ZoneStore},
    time::SystemTime,
    zone::normalize_key,
    FixedTime,
};

// NOTE: preview-only key
const FIX: &str = "fix";

pub fn run(args: impl Iterator<Item = String>) {
    let mut configuration = BTreeMap::new();
    let mut zones = Vec::new();
    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => {
                configuration.insert(key.to_string(), value.to_string());
            }
            None => zones.push(arg),
        }
    }
    let fix = configuration.remove(FIX);
    let persistent = configuration.contains_key("store_path");
    let config = PluginConfig::from_map(configuration);
    init_logging(config.logging());

    if persistent {
        let store = JsonFileStore::new(&config.store_path);
        show(store, &config, &zones, fix.as_deref());
    } else {
        show(MemoryStore::default(), &config, &zones, fix.as_deref());
    }
}

fn show<St: ZoneStore>(store: St, config: &PluginConfig, zones: &[String], fix: Option<&str>) {
    let mut registry = ClockRegistry::new(store, config.surfaces(), Rc::new(SystemTime));
    for zone in zones {
        if let Err(err) = registry.add(zone) {
            error!("{err}");
        }
    }

    if let Some((zone, time)) = fix.and_then(|fix| fix.split_once('@')) {
        let result = FixedTime::from_input(time)
            .and_then(|fixed| registry.apply_fixed(&normalize_key(zone), fixed));
        if let Err(err) = result {
            error!("{err}");
        }
    }

    for row in registry.render_rows(None) {
        println!("{row}");
    }
}
