//! Clock option schema.
//!
//! Every option is described once in [`DESCRIPTORS`]: a validator, an optional
//! coercion used when validation fails, and an optional hook the widget runs
//! after the value changes. Applying options anywhere in the crate goes through
//! this table.

use log::warn;

use std::{collections::BTreeMap, str::FromStr};

use crate::{
    error::{ClockError, Result},
    zone::Zone,
};

/// Loosely typed option value, as supplied by callers or surface attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Reads an attribute string the way declarative attributes are typed:
    /// booleans and numbers are recognised, everything else stays text.
    pub fn parse_attribute(raw: &str) -> Self {
        match raw.trim() {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            "null" => OptionValue::Null,
            trimmed => match trimmed.parse::<f64>() {
                Ok(number) if number.is_finite() => OptionValue::Number(number),
                _ => OptionValue::Text(trimmed.to_string()),
            },
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            OptionValue::Null => false,
            OptionValue::Bool(b) => *b,
            OptionValue::Number(n) => *n != 0.0 && !n.is_nan(),
            OptionValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Number(value.into())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<Zone> for OptionValue {
    fn from(value: Zone) -> Self {
        OptionValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionName {
    AnimationTime,
    BlinkSeparators,
    SeparatorOnOpacity,
    SeparatorOffOpacity,
    ShowAmpm,
    ShowSeconds,
    Timezone,
    Use12HourFormat,
}

impl OptionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::AnimationTime => "animationTime",
            OptionName::BlinkSeparators => "blinkSeparators",
            OptionName::SeparatorOnOpacity => "separatorOnOpacity",
            OptionName::SeparatorOffOpacity => "separatorOffOpacity",
            OptionName::ShowAmpm => "showAmpm",
            OptionName::ShowSeconds => "showSeconds",
            OptionName::Timezone => "timezone",
            OptionName::Use12HourFormat => "use12HourFormat",
        }
    }
}

impl FromStr for OptionName {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self> {
        DESCRIPTORS
            .iter()
            .map(|descriptor| descriptor.name)
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ClockError::UnknownOption(s.to_string()))
    }
}

/// Side effect a widget runs after an option changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    SeparatorBlink,
    SeparatorOpacity,
    AmpmVisibility,
    SecondsVisibility,
}

pub struct OptionDescriptor {
    pub name: OptionName,
    pub description: &'static str,
    validator: fn(&OptionValue) -> bool,
    coercion: Option<fn(&OptionValue) -> OptionValue>,
    pub hook: Option<Hook>,
}

impl OptionDescriptor {
    /// The value to store for `value`, or `None` when it is invalid and
    /// cannot be coerced.
    pub fn accept(&self, value: &OptionValue) -> Option<OptionValue> {
        if (self.validator)(value) {
            Some(value.clone())
        } else {
            self.coercion.map(|coerce| coerce(value))
        }
    }

    fn invalid(&self) -> ClockError {
        ClockError::InvalidOption {
            name: self.name.as_str().to_string(),
            reason: format!("should be {}", self.description),
        }
    }
}

fn is_boolean(value: &OptionValue) -> bool {
    value.as_bool().is_some()
}

fn is_opacity(value: &OptionValue) -> bool {
    value.as_number().map_or(false, |o| (0.0..=1.0).contains(&o))
}

fn is_animation_time(value: &OptionValue) -> bool {
    value
        .as_number()
        .map_or(false, |t| t.fract() == 0.0 && (0.0..=1000.0).contains(&t))
}

fn is_timezone(value: &OptionValue) -> bool {
    value.as_text().map_or(false, |tz| tz.parse::<Zone>().is_ok())
}

fn coerce_to_boolean(value: &OptionValue) -> OptionValue {
    OptionValue::Bool(value.truthy())
}

pub static DESCRIPTORS: [OptionDescriptor; 8] = [
    OptionDescriptor {
        name: OptionName::AnimationTime,
        description: "the animation time in milliseconds, an integer between 0 and 1,000 inclusive",
        validator: is_animation_time,
        coercion: None,
        hook: None,
    },
    OptionDescriptor {
        name: OptionName::BlinkSeparators,
        description: "a boolean indicating whether or not to blink the separators",
        validator: is_boolean,
        coercion: Some(coerce_to_boolean),
        hook: Some(Hook::SeparatorBlink),
    },
    OptionDescriptor {
        name: OptionName::SeparatorOnOpacity,
        description: "the opacity of a separator when on, between 0 and 1 inclusive",
        validator: is_opacity,
        coercion: None,
        hook: Some(Hook::SeparatorOpacity),
    },
    OptionDescriptor {
        name: OptionName::SeparatorOffOpacity,
        description: "the opacity of a separator when off, between 0 and 1 inclusive",
        validator: is_opacity,
        coercion: None,
        hook: None,
    },
    OptionDescriptor {
        name: OptionName::ShowAmpm,
        description: "a boolean indicating whether or not to show AM/PM in 12 hour format",
        validator: is_boolean,
        coercion: Some(coerce_to_boolean),
        hook: Some(Hook::AmpmVisibility),
    },
    OptionDescriptor {
        name: OptionName::ShowSeconds,
        description: "a boolean indicating whether or not to show the seconds",
        validator: is_boolean,
        coercion: Some(coerce_to_boolean),
        hook: Some(Hook::SecondsVisibility),
    },
    OptionDescriptor {
        name: OptionName::Timezone,
        description: "an IANA timezone name, or the special value 'LOCAL'",
        validator: is_timezone,
        coercion: None,
        hook: None,
    },
    OptionDescriptor {
        name: OptionName::Use12HourFormat,
        description: "a boolean indicating whether or not to render in 12 hour format",
        validator: is_boolean,
        coercion: Some(coerce_to_boolean),
        hook: Some(Hook::AmpmVisibility),
    },
];

// DESCRIPTORS is ordered like OptionName.
pub fn descriptor(name: OptionName) -> &'static OptionDescriptor {
    &DESCRIPTORS[name as usize]
}

/// Explicit options handed to a clock's constructor.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClockOptions(BTreeMap<OptionName, OptionValue>);

impl ClockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: OptionName, value: impl Into<OptionValue>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    pub fn get(&self, name: OptionName) -> Option<&OptionValue> {
        self.0.get(&name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    pub timezone: Zone,
    pub use_12_hour_format: bool,
    pub show_seconds: bool,
    pub show_ampm: bool,
    pub blink_separators: bool,
    pub separator_on_opacity: f64,
    pub separator_off_opacity: f64,
    pub animation_time: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: Zone::Local,
            use_12_hour_format: false,
            show_seconds: false,
            show_ampm: true,
            blink_separators: true,
            separator_on_opacity: 0.8,
            separator_off_opacity: 0.2,
            animation_time: 250,
        }
    }
}

impl ClockConfig {
    /// Merges explicit options over surface attributes over defaults, one
    /// option at a time. Rejected values are logged and skipped.
    pub fn from_sources(
        explicit: &ClockOptions,
        attribute: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();
        for descriptor in DESCRIPTORS.iter() {
            let name = descriptor.name;
            if let Some(value) = explicit.get(name) {
                match descriptor.accept(value) {
                    Some(value) => {
                        config.store(name, &value);
                        continue;
                    }
                    None => warn!(
                        "ignoring invalid value for option '{}' passed to constructor (should be {})",
                        name.as_str(),
                        descriptor.description
                    ),
                }
            }
            if let Some(raw) = attribute(name.as_str()) {
                match descriptor.accept(&OptionValue::parse_attribute(&raw)) {
                    Some(value) => config.store(name, &value),
                    None => warn!(
                        "ignoring invalid value for option '{}' from attribute (should be {})",
                        name.as_str(),
                        descriptor.description
                    ),
                }
            }
        }
        config
    }

    pub fn get(&self, name: OptionName) -> OptionValue {
        match name {
            OptionName::AnimationTime => self.animation_time.into(),
            OptionName::BlinkSeparators => self.blink_separators.into(),
            OptionName::SeparatorOnOpacity => self.separator_on_opacity.into(),
            OptionName::SeparatorOffOpacity => self.separator_off_opacity.into(),
            OptionName::ShowAmpm => self.show_ampm.into(),
            OptionName::ShowSeconds => self.show_seconds.into(),
            OptionName::Timezone => self.timezone.into(),
            OptionName::Use12HourFormat => self.use_12_hour_format.into(),
        }
    }

    /// A copy of this configuration with one option replaced.
    pub fn with_option(&self, name: OptionName, value: &OptionValue) -> Result<Self> {
        let descriptor = descriptor(name);
        let accepted = descriptor.accept(value).ok_or_else(|| descriptor.invalid())?;
        let mut config = self.clone();
        config.store(name, &accepted);
        Ok(config)
    }

    // Values reaching here have passed their descriptor.
    fn store(&mut self, name: OptionName, value: &OptionValue) {
        match name {
            OptionName::AnimationTime => {
                if let Some(t) = value.as_number() {
                    self.animation_time = t as u32;
                }
            }
            OptionName::SeparatorOnOpacity => {
                if let Some(o) = value.as_number() {
                    self.separator_on_opacity = o;
                }
            }
            OptionName::SeparatorOffOpacity => {
                if let Some(o) = value.as_number() {
                    self.separator_off_opacity = o;
                }
            }
            OptionName::Timezone => {
                if let Some(zone) = value.as_text().and_then(|tz| tz.parse().ok()) {
                    self.timezone = zone;
                }
            }
            OptionName::BlinkSeparators => self.blink_separators = value.truthy(),
            OptionName::ShowAmpm => self.show_ampm = value.truthy(),
            OptionName::ShowSeconds => self.show_seconds = value.truthy(),
            OptionName::Use12HourFormat => self.use_12_hour_format = value.truthy(),
        }
    }
}
