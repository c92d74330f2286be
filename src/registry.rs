use chrono::Local;
use log::{debug, error, info};

use std::{fmt::Display, rc::Rc};

use crate::{
    error::{ClockError, Result},
    options::{ClockOptions, OptionName},
    segment::Segment,
    store::ZoneStore,
    surface::Surface,
    time::TimeSource,
    widget::{ClockWidget, FixedTime},
    zone::{display_name, normalize_key, Zone, LOCAL},
};

pub struct ClockEntry<S: Surface> {
    pub key: String,
    pub zone: String,
    pub widget: ClockWidget<S>,
}

/// The set of clocks on screen, one per configured zone, with `LOCAL` first.
///
/// Zone names are persisted through a [`ZoneStore`]; widgets are rebuilt from
/// the stored list after every change.
pub struct ClockRegistry<St: ZoneStore, S: Surface> {
    store: St,
    entries: Vec<ClockEntry<S>>,
    surfaces: Box<dyn FnMut(&str) -> S>,
    time: Rc<dyn TimeSource>,
}

impl<St: ZoneStore, S: Surface> ClockRegistry<St, S> {
    /// `surfaces` hands out a fresh surface for the named zone.
    pub fn new(
        store: St,
        surfaces: impl FnMut(&str) -> S + 'static,
        time: Rc<dyn TimeSource>,
    ) -> Self {
        let mut registry = Self {
            store,
            entries: Vec::new(),
            surfaces: Box::new(surfaces),
            time,
        };
        registry.rebuild_all();
        registry
    }

    pub fn list(&self) -> Vec<String> {
        let mut zones = vec![LOCAL.to_string()];
        for zone in self.store.get_list() {
            if !zones.contains(&zone) {
                zones.push(zone);
            }
        }
        zones
    }

    pub fn has(&self, zone: &str) -> bool {
        zone == LOCAL || self.store.get_list().iter().any(|z| z == zone)
    }

    pub fn entries(&self) -> &[ClockEntry<S>] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&ClockEntry<S>> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Adds a clock for `zone`. Returns false if it is already shown.
    pub fn add(&mut self, zone: &str) -> Result<bool> {
        if self.has(zone) {
            return Ok(false);
        }
        if zone.parse::<Zone>().is_err() {
            return Err(ClockError::InvalidOption {
                name: OptionName::Timezone.as_str().to_string(),
                reason: format!("'{zone}' is not an IANA timezone"),
            });
        }
        let mut zones = self.store.get_list();
        zones.push(zone.to_string());
        self.store.set_list(&zones)?;
        info!("added clock for {zone}");
        self.rebuild_all();
        Ok(true)
    }

    /// Removes the clock for `zone`. `LOCAL` stays.
    pub fn remove(&mut self, zone: &str) -> Result<bool> {
        if zone == LOCAL {
            return Ok(false);
        }
        let mut zones = self.store.get_list();
        let before = zones.len();
        zones.retain(|z| z != zone);
        if zones.len() == before {
            return Ok(false);
        }
        self.store.set_list(&zones)?;
        info!("removed clock for {zone}");
        self.rebuild_all();
        Ok(true)
    }

    pub fn rebuild_all(&mut self) {
        // old widgets release their surfaces on drop
        self.entries.clear();
        for zone in self.list() {
            let surface = (self.surfaces)(zone.as_str());
            // the zone always comes from the entry, other options from the surface
            let options = ClockOptions::new().with(OptionName::Timezone, zone.as_str());
            match ClockWidget::new(surface, &options, self.time.clone()) {
                Ok(widget) => self.entries.push(ClockEntry {
                    key: normalize_key(&zone),
                    zone,
                    widget,
                }),
                Err(err) => error!("could not create clock for {zone}: {err}"),
            }
        }
        debug!("rebuilt {} clocks", self.entries.len());
    }

    /// Pins every clock to the instant at which the clock under
    /// `reference_key` reads `hour:minute:second` today.
    pub fn apply_fix(
        &mut self,
        reference_key: &str,
        hour: u32,
        minute: u32,
        second: Option<u32>,
    ) -> Result<()> {
        let fixed = FixedTime::new(hour, minute, second)?;
        self.apply_fixed(reference_key, fixed)
    }

    pub fn apply_fixed(&mut self, reference_key: &str, fixed: FixedTime) -> Result<()> {
        let reference = self
            .entry(reference_key)
            .ok_or_else(|| ClockError::Validation(format!("no clock '{reference_key}'")))?;
        let zone = reference.widget.config().timezone;

        let today = self.time.now().with_timezone(&Local).date_naive();
        let instant = zone.resolve(today.and_time(fixed.time())).ok_or_else(|| {
            ClockError::Validation(format!(
                "{:02}:{:02} does not exist in {zone} today",
                fixed.hour, fixed.minute
            ))
        })?;

        // every projection is computed before any clock is touched
        let pins: Vec<FixedTime> = self
            .entries
            .iter()
            .map(|entry| entry.widget.config().timezone.wall_clock(instant).time().into())
            .collect();
        for (entry, pin) in self.entries.iter_mut().zip(pins) {
            entry.widget.pin(pin);
        }
        info!("pinned {} clocks to {instant}", self.entries.len());
        Ok(())
    }

    pub fn release_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.widget.release();
        }
        info!("released {} clocks", self.entries.len());
    }

    /// Fires every clock whose tick is due. Returns whether any rendered.
    pub fn poll(&mut self) -> bool {
        let now = self.time.now();
        let mut rendered = false;
        for entry in self.entries.iter_mut() {
            rendered |= entry.widget.poll(now);
        }
        rendered
    }
}

impl<St: ZoneStore, S: Surface + Display + Clone + 'static> ClockRegistry<St, S> {
    /// One labelled line per clock.
    pub fn render_rows(&self, selected: Option<usize>) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let title = Segment::new_title(
                    &display_name(&entry.zone),
                    selected == Some(index),
                    entry.widget.fixed_time().is_some(),
                );
                let clock = Segment::new_clock(Box::new(entry.widget.surface().clone()));
                format!("{title}{clock}")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::MemoryStore,
        surface::{Part, TextSurface},
        time::ManualTime,
    };
    use chrono::{TimeZone, Timelike, Utc};

    type Registry = ClockRegistry<MemoryStore, TextSurface>;

    fn registry(zones: &[&str]) -> (Registry, Rc<ManualTime>) {
        let time = Rc::new(ManualTime::new(
            Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
        ));
        let store = MemoryStore::new(zones.iter().map(|z| z.to_string()).collect());
        let registry = ClockRegistry::new(store, |_| TextSurface::new(), time.clone());
        (registry, time)
    }

    fn shown(registry: &Registry, key: &str) -> (String, String) {
        let surface = registry.entry(key).unwrap().widget.surface();
        (
            surface.text(Part::Hours).unwrap(),
            surface.text(Part::Minutes).unwrap(),
        )
    }

    #[test]
    fn local_is_always_first() {
        let (registry, _) = registry(&["Asia/Tokyo", "LOCAL"]);
        assert_eq!(registry.list(), vec!["LOCAL", "Asia/Tokyo"]);
        let keys: Vec<&str> = registry.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["local", "asia-tokyo"]);
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let (mut registry, _) = registry(&[]);
        assert!(registry.add("Europe/Dublin").unwrap());
        assert!(!registry.add("Europe/Dublin").unwrap());
        assert_eq!(registry.list(), vec!["LOCAL", "Europe/Dublin"]);
        assert_eq!(registry.entries().len(), 2);
    }

    #[test]
    fn unknown_zones_are_not_added() {
        let (mut registry, _) = registry(&[]);
        assert!(matches!(
            registry.add("Europe/Atlantis"),
            Err(ClockError::InvalidOption { .. })
        ));
        assert_eq!(registry.list(), vec!["LOCAL"]);
    }

    #[test]
    fn local_cannot_be_removed() {
        let (mut registry, _) = registry(&["Asia/Tokyo"]);
        assert!(!registry.remove("LOCAL").unwrap());
        assert_eq!(registry.list(), vec!["LOCAL", "Asia/Tokyo"]);
        assert!(!registry.add("LOCAL").unwrap());
        assert_eq!(registry.entries().len(), 2);
    }

    #[test]
    fn add_then_remove_restores_the_list() {
        let (mut registry, _) = registry(&["Asia/Tokyo", "America/New_York"]);
        let before = registry.list();
        registry.add("Europe/Dublin").unwrap();
        assert!(registry.remove("Europe/Dublin").unwrap());
        assert_eq!(registry.list(), before);
        assert!(registry.entry("europe-dublin").is_none());
    }

    #[test]
    fn rebuild_frees_old_surfaces() {
        let surfaces: Rc<std::cell::RefCell<Vec<TextSurface>>> = Default::default();
        let handed_out = surfaces.clone();
        let time = Rc::new(ManualTime::new(Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()));
        let mut registry = ClockRegistry::new(
            MemoryStore::default(),
            move |_| {
                let surface = TextSurface::new();
                handed_out.borrow_mut().push(surface.clone());
                surface
            },
            time,
        );
        registry.add("Asia/Tokyo").unwrap();
        let surfaces = surfaces.borrow();
        assert_eq!(surfaces.len(), 3);
        assert!(!surfaces[0].is_bound());
        assert!(surfaces[1].is_bound());
        assert!(surfaces[2].is_bound());
    }

    #[test]
    fn fix_pins_every_clock_to_the_same_instant() {
        let (mut registry, time) = registry(&["Europe/Dublin", "America/New_York", "Asia/Tokyo"]);
        registry.apply_fix("europe-dublin", 10, 30, None).unwrap();

        assert_eq!(shown(&registry, "europe-dublin"), ("10".into(), "30".into()));
        assert_eq!(shown(&registry, "america-new_york"), ("05".into(), "30".into()));
        assert_eq!(shown(&registry, "asia-tokyo"), ("18".into(), "30".into()));

        let local = Utc
            .with_ymd_and_hms(2024, 7, 1, 9, 30, 0)
            .unwrap()
            .with_timezone(&Local);
        let fixed = registry.entry("local").unwrap().widget.fixed_time().unwrap();
        assert_eq!((fixed.hour, fixed.minute), (local.hour(), local.minute()));

        time.advance(chrono::Duration::minutes(5));
        registry.poll();
        assert_eq!(shown(&registry, "america-new_york"), ("05".into(), "30".into()));
        assert!(registry.entries().iter().all(|e| e.widget.fixed_time().is_some()));
    }

    #[test]
    fn invalid_fix_changes_nothing() {
        let (mut registry, _) = registry(&["Europe/Dublin", "America/New_York"]);
        registry.apply_fix("europe-dublin", 10, 30, None).unwrap();
        let before: Vec<_> = registry.entries().iter().map(|e| e.widget.fixed_time()).collect();

        assert!(matches!(
            registry.apply_fix("europe-dublin", 24, 0, None),
            Err(ClockError::Validation(_))
        ));
        assert!(matches!(
            registry.apply_fix("america-new_york", 12, 60, None),
            Err(ClockError::Validation(_))
        ));
        assert!(matches!(
            registry.apply_fix("asia-tokyo", 12, 0, None),
            Err(ClockError::Validation(_))
        ));
        let after: Vec<_> = registry.entries().iter().map(|e| e.widget.fixed_time()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn release_all_resumes_live_time() {
        let (mut registry, time) = registry(&["Asia/Tokyo"]);
        registry.apply_fix("asia-tokyo", 3, 15, Some(20)).unwrap();
        time.advance(chrono::Duration::seconds(61));
        registry.release_all();

        assert!(registry.entries().iter().all(|e| e.widget.fixed_time().is_none()));
        assert_eq!(shown(&registry, "asia-tokyo"), ("21".into(), "01".into()));
    }

    #[test]
    fn rows_label_each_clock() {
        let (registry, _) = registry(&["America/Argentina/Buenos_Aires"]);
        let rows: Vec<String> = registry
            .render_rows(Some(1))
            .into_iter()
            .map(strip_ansi_escapes::strip_str)
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with(" Local time"));
        assert!(rows[1].starts_with(" Argentina - Buenos Aires"));
        assert!(rows[1].trim_end().ends_with("09:00"));
    }
}
