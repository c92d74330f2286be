use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};
use log::debug;

use std::{fmt::Display, rc::Rc};

use crate::{
    error::{ClockError, Result},
    options::{descriptor, ClockConfig, ClockOptions, Hook, OptionName, OptionValue, DESCRIPTORS},
    surface::{Part, Surface},
    time::{TickHandle, TimeSource},
};

/// Wall-clock value a clock is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl FixedTime {
    pub fn new(hour: u32, minute: u32, second: Option<u32>) -> Result<Self> {
        let second = second.unwrap_or(0);
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ClockError::Validation(format!(
                "{hour:02}:{minute:02}:{second:02} is not a valid time of day"
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Parses raw hour, minute and second input. An empty hour or minute means
    /// the user has not finished typing and yields `Ok(None)`; an empty second
    /// counts as zero.
    pub fn parse(hour: &str, minute: &str, second: &str) -> Result<Option<Self>> {
        let (hour, minute, second) = (hour.trim(), minute.trim(), second.trim());
        if hour.is_empty() || minute.is_empty() {
            return Ok(None);
        }
        let number = |field: &str, raw: &str| {
            raw.parse::<u32>()
                .map_err(|_| ClockError::Validation(format!("{field} '{raw}' is not a number")))
        };
        let second = match second {
            "" => None,
            raw => Some(number("second", raw)?),
        };
        Self::new(number("hour", hour)?, number("minute", minute)?, second).map(Some)
    }

    /// Parses `HH:MM` or `HH:MM:SS` input.
    pub fn parse_hms(text: &str) -> Result<Option<Self>> {
        let mut fields = text.trim().splitn(3, ':');
        let hour = fields.next().unwrap_or_default();
        let minute = fields.next().unwrap_or_default();
        let second = fields.next().unwrap_or_default();
        Self::parse(hour, minute, second)
    }

    /// Like [`FixedTime::parse_hms`], but unfinished input is an error.
    pub fn from_input(text: &str) -> Result<Self> {
        Self::parse_hms(text)?.ok_or_else(|| {
            ClockError::Validation(format!("'{}' is incomplete, enter HH:MM", text.trim()))
        })
    }

    pub fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second).unwrap_or_default()
    }
}

impl From<NaiveTime> for FixedTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }
}

/// A live digital clock bound to one surface.
///
/// The clock ticks once a second while running. Pinning it with
/// [`ClockWidget::fix`] keeps the separators blinking but freezes the digits
/// on the given wall-clock time until [`ClockWidget::release`].
pub struct ClockWidget<S: Surface> {
    surface: S,
    config: ClockConfig,
    fixed: Option<FixedTime>,
    tick: TickHandle,
    time: Rc<dyn TimeSource>,
}

impl<S: Surface> ClockWidget<S> {
    pub fn new(mut surface: S, options: &ClockOptions, time: Rc<dyn TimeSource>) -> Result<Self> {
        if !surface.is_single_target() {
            return Err(ClockError::Configuration(
                "a clock needs exactly one span, div, paragraph or heading to render into".into(),
            ));
        }
        if surface.is_bound() {
            return Err(ClockError::Configuration(
                "this surface already hosts a clock, it cannot be re-initialised".into(),
            ));
        }

        let config = ClockConfig::from_sources(options, |name| surface.attribute(name));

        surface.bind();
        for part in Part::ALL {
            surface.append(part, part.placeholder());
        }

        let mut widget = Self {
            surface,
            config,
            fixed: None,
            tick: TickHandle::default(),
            time,
        };
        for descriptor in DESCRIPTORS.iter() {
            if let Some(hook) = descriptor.hook {
                widget.run_hook(hook);
            }
        }
        widget.start();
        Ok(widget)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn option_value(&self, name: &str) -> Result<OptionValue> {
        Ok(self.config.get(name.parse()?))
    }

    /// Sets one option, then runs its hook. Nothing changes on error.
    pub fn option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<&mut Self> {
        let name: OptionName = name.parse()?;
        self.config = self.config.with_option(name, &value.into())?;
        if let Some(hook) = descriptor(name).hook {
            self.run_hook(hook);
        }
        Ok(self)
    }

    pub fn fixed_time(&self) -> Option<FixedTime> {
        self.fixed
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_active()
    }

    /// The wall-clock time to display in this clock's zone. A pinned clock
    /// reads today's date at the pinned time.
    pub fn current_instant(&self) -> NaiveDateTime {
        let now = self.config.timezone.wall_clock(self.time.now());
        match self.fixed {
            Some(fixed) => now.date().and_time(fixed.time()),
            None => now,
        }
    }

    /// RFC 3339 rendering of the displayed time, `None` when a pinned time
    /// does not exist in this zone today.
    pub fn current_time(&self) -> Option<String> {
        let zone = self.config.timezone;
        zone.resolve(self.current_instant())
            .map(|instant| zone.with_offset(instant).to_rfc3339())
    }

    pub fn fix(&mut self, hour: u32, minute: u32, second: Option<u32>) -> Result<&mut Self> {
        let fixed = FixedTime::new(hour, minute, second)?;
        Ok(self.pin(fixed))
    }

    pub fn pin(&mut self, fixed: FixedTime) -> &mut Self {
        self.fixed = Some(fixed);
        self.refresh()
    }

    pub fn release(&mut self) -> &mut Self {
        self.fixed = None;
        self.refresh()
    }

    pub fn start(&mut self) -> &mut Self {
        if self.is_running() {
            return self;
        }
        self.render();
        self.tick.schedule(self.time.now());
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.tick.cancel();
        self
    }

    /// Renders if the next tick is due. Returns whether it rendered.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.tick.fire(now) {
            self.render();
            return true;
        }
        false
    }

    fn refresh(&mut self) -> &mut Self {
        if self.is_running() {
            self.render();
            self
        } else {
            self.start()
        }
    }

    pub fn render(&mut self) {
        let now = self.current_instant();
        let hours = if self.config.use_12_hour_format {
            now.format("%-I")
        } else {
            now.format("%H")
        };
        self.surface.set_text(Part::Hours, &hours.to_string());
        self.surface.set_text(Part::Minutes, &now.format("%M").to_string());
        self.surface.set_text(Part::Seconds, &now.format("%S").to_string());
        self.surface.set_text(Part::Ampm, &now.format("%p").to_string());

        if self.config.blink_separators {
            let opacity = if now.second() % 2 == 0 {
                self.config.separator_on_opacity
            } else {
                self.config.separator_off_opacity
            };
            self.fade_separators(opacity);
        }
    }

    fn fade_separators(&mut self, opacity: f64) {
        let animation = Some(self.config.animation_time);
        self.surface.set_opacity(Part::SeparatorHm, opacity, animation);
        if self.config.show_seconds {
            self.surface.set_opacity(Part::SeparatorMs, opacity, animation);
        } else {
            // hidden, so held on rather than blinking
            let on = self.config.separator_on_opacity;
            self.surface.set_opacity(Part::SeparatorMs, on, None);
        }
    }

    fn run_hook(&mut self, hook: Hook) {
        let config = self.config.clone();
        let animation = config.animation_time;
        match hook {
            Hook::SeparatorBlink => {
                if !config.blink_separators {
                    self.fade_separators(config.separator_on_opacity);
                }
            }
            Hook::SeparatorOpacity => {
                if !config.blink_separators {
                    let on = config.separator_on_opacity;
                    self.surface.set_opacity(Part::SeparatorHm, on, None);
                    self.surface.set_opacity(Part::SeparatorMs, on, None);
                }
            }
            Hook::AmpmVisibility => {
                let visible = config.show_ampm && config.use_12_hour_format;
                self.surface.set_visible(Part::Ampm, visible, animation);
            }
            Hook::SecondsVisibility => {
                let visible = config.show_seconds;
                self.surface.set_visible(Part::SeparatorMs, visible, animation);
                self.surface.set_visible(Part::Seconds, visible, animation);
            }
        }
    }
}

impl<S: Surface> Display for ClockWidget<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let now = self.current_instant();
        let config = &self.config;
        if config.use_12_hour_format {
            write!(f, "{}", now.format("%-I"))?;
        } else {
            write!(f, "{}", now.format("%H"))?;
        }
        write!(f, ":{}", now.format("%M"))?;
        if config.show_seconds {
            write!(f, ":{}", now.format("%S"))?;
        }
        if config.use_12_hour_format && config.show_ampm {
            write!(f, "{}", now.format("%p"))?;
        }
        Ok(())
    }
}

impl<S: Surface> Drop for ClockWidget<S> {
    fn drop(&mut self) {
        debug!("disposing clock for {}", self.config.timezone);
        self.stop();
        self.surface.unbind();
    }
}
