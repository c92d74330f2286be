use std::{cmp::min, collections::BTreeMap, rc::Rc};

use log::info;
use worldclock::{
    config::PluginConfig,
    logging::init_logging,
    registry::ClockRegistry,
    segment::Segment,
    store::JsonFileStore,
    surface::TextSurface,
    time::SystemTime,
    zone, FixedTime,
};
use zellij_tile::prelude::*;

const HINT: &str = "↑↓ select  f check another time  r back to live  a add  d remove";

#[derive(Default)]
enum Input {
    #[default]
    Idle,
    Fix(String),
    Add(String),
}

#[derive(Default)]
pub struct WorldClockPlugin {
    registry: Option<ClockRegistry<JsonFileStore, TextSurface>>,
    selected: usize,
    input: Input,
    message: Option<String>,
}

impl ZellijPlugin for WorldClockPlugin {
    fn load(&mut self, configuration: BTreeMap<String, String>) {
        let config = PluginConfig::from_map(configuration);
        init_logging(config.logging());

        subscribe(&[EventType::Timer, EventType::Key]);
        set_selectable(config.selectable);

        let store = JsonFileStore::new(&config.store_path);
        info!("loading clocks from {}", store.path().display());
        self.registry = Some(ClockRegistry::new(store, config.surfaces(), Rc::new(SystemTime)));

        set_timeout(1.0);
    }

    fn update(&mut self, event: Event) -> bool {
        match event {
            Event::Timer(_) => {
                set_timeout(1.0);
                self.registry.as_mut().map_or(false, |registry| registry.poll())
            }
            Event::Key(key) => self.handle_key(key),
            _ => false,
        }
    }

    fn render(&mut self, rows: usize, _cols: usize) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };

        let mut lines = registry.render_rows(Some(self.selected));
        match &self.input {
            Input::Fix(text) => lines.push(Segment::new_prompt("H:M", text).to_string()),
            Input::Add(text) => lines.push(Segment::new_prompt("New clock in", text).to_string()),
            Input::Idle => {}
        }
        if let Some(message) = &self.message {
            lines.push(Segment::new_warning(message).to_string());
        }
        lines.push(Segment::new(Box::new(HINT), Default::default()).max_width(96).to_string());

        for line in lines.iter().take(rows) {
            println!("{line}");
        }
    }
}

impl WorldClockPlugin {
    fn handle_key(&mut self, key: Key) -> bool {
        if key == Key::Esc {
            self.input = Input::Idle;
            self.message = None;
            return true;
        }
        match &mut self.input {
            Input::Idle => self.handle_command(key),
            Input::Add(text) if key == Key::Char('\t') => {
                if let Some(name) = zone::complete(text) {
                    *text = name.to_string();
                }
                true
            }
            Input::Fix(text) | Input::Add(text) => match key {
                Key::Char('\n') => {
                    self.submit();
                    true
                }
                Key::Backspace => {
                    text.pop();
                    true
                }
                Key::Char(c) => {
                    text.push(c);
                    true
                }
                _ => false,
            },
        }
    }

    fn handle_command(&mut self, key: Key) -> bool {
        let Some(registry) = self.registry.as_mut() else {
            return false;
        };
        let last = registry.entries().len().saturating_sub(1);
        match key {
            Key::Up => self.selected = self.selected.saturating_sub(1),
            Key::Down => self.selected = min(self.selected + 1, last),
            Key::Char('f') => self.input = Input::Fix(String::new()),
            Key::Char('a') => self.input = Input::Add(String::new()),
            Key::Char('r') => {
                registry.release_all();
                self.message = None;
            }
            Key::Char('d') => {
                if let Some(zone) = registry.entries().get(self.selected).map(|e| e.zone.clone()) {
                    self.message = registry.remove(&zone).err().map(|err| err.to_string());
                    self.selected = min(self.selected, registry.entries().len().saturating_sub(1));
                }
            }
            _ => return false,
        }
        true
    }

    fn submit(&mut self) {
        let input = std::mem::take(&mut self.input);
        let Some(registry) = self.registry.as_mut() else {
            return;
        };
        let result = match input {
            Input::Fix(text) => {
                let key = registry.entries().get(self.selected).map(|e| e.key.clone());
                match (FixedTime::from_input(&text), key) {
                    (Ok(fixed), Some(key)) => registry.apply_fixed(&key, fixed),
                    (Err(err), _) => Err(err),
                    (Ok(_), None) => Ok(()),
                }
            }
            Input::Add(text) => registry.add(text.trim()).map(|_| ()),
            Input::Idle => Ok(()),
        };
        self.message = result.err().map(|err| err.to_string());
    }
}
