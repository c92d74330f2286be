use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{Tz, TZ_VARIANTS};

use std::{fmt::Display, str::FromStr};

/// Sentinel zone name for the host system's local timezone.
pub const LOCAL: &str = "LOCAL";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    #[default]
    Local,
    Named(Tz),
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == LOCAL {
            return Ok(Zone::Local);
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|err| err.to_string())
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Local => write!(f, "{LOCAL}"),
            Zone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

impl Zone {
    /// Wall-clock reading of `instant` in this zone.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&Local).naive_local(),
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Instant at which this zone reads `wall`. Ambiguous readings resolve to
    /// the earlier instant, readings skipped by a DST jump resolve to `None`.
    pub fn resolve(&self, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Local => earliest(Local.from_local_datetime(&wall)),
            Zone::Named(tz) => earliest(tz.from_local_datetime(&wall)),
        }
    }

    pub fn with_offset(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => {
                let local = instant.with_timezone(&Local);
                local.with_timezone(&local.offset().fix())
            }
            Zone::Named(tz) => {
                let zoned = instant.with_timezone(tz);
                zoned.with_timezone(&zoned.offset().fix())
            }
        }
    }
}

fn earliest<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<DateTime<Utc>> {
    match result {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Registry key for a zone name: lower case, path separators replaced by dashes.
pub fn normalize_key(zone: &str) -> String {
    zone.to_lowercase().replace('/', "-")
}

/// Every IANA zone name, in database order.
pub fn available_zones() -> impl Iterator<Item = &'static str> {
    TZ_VARIANTS.iter().map(|tz| tz.name())
}

/// First zone name starting with `prefix`, ignoring case.
pub fn complete(prefix: &str) -> Option<&'static str> {
    let prefix = prefix.to_lowercase();
    available_zones().find(|zone| zone.to_lowercase().starts_with(&prefix))
}

/// `America/Argentina/Buenos_Aires` -> `Argentina - Buenos Aires`.
pub fn display_name(zone: &str) -> String {
    if zone == LOCAL {
        return "Local time".to_string();
    }
    let mut parts = zone.split('/');
    let region = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();
    let name = if rest.is_empty() {
        region.to_string()
    } else {
        rest.join(" - ")
    };
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Timelike};

    fn wall(date: (i32, u32, u32), time: (u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap())
    }

    #[test]
    fn parses_local_and_iana_names() {
        assert_eq!("LOCAL".parse::<Zone>(), Ok(Zone::Local));
        assert_eq!(
            "Europe/Dublin".parse::<Zone>(),
            Ok(Zone::Named(chrono_tz::Europe::Dublin))
        );
        assert!("Mars/Olympus_Mons".parse::<Zone>().is_err());
        assert!("local".parse::<Zone>().is_err());
    }

    #[test]
    fn display_round_trips_the_zone_name() {
        let zone: Zone = "America/New_York".parse().unwrap();
        assert_eq!(zone.to_string(), "America/New_York");
        assert_eq!(Zone::Local.to_string(), LOCAL);
    }

    #[test]
    fn wall_clock_applies_summer_offsets() {
        let instant = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();
        let dublin: Zone = "Europe/Dublin".parse().unwrap();
        let new_york: Zone = "America/New_York".parse().unwrap();
        assert_eq!(dublin.wall_clock(instant).hour(), 10);
        assert_eq!(new_york.wall_clock(instant).hour(), 5);
        assert_eq!(new_york.wall_clock(instant).minute(), 30);
    }

    #[test]
    fn resolve_rejects_skipped_times_and_picks_earliest_for_repeated_ones() {
        let dublin: Zone = "Europe/Dublin".parse().unwrap();
        assert_eq!(dublin.resolve(wall((2024, 3, 31), (1, 30))), None);

        let repeated = dublin.resolve(wall((2024, 10, 27), (1, 30))).unwrap();
        assert_eq!(repeated, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn with_offset_reports_the_zone_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let tokyo: Zone = "Asia/Tokyo".parse().unwrap();
        assert_eq!(
            tokyo.with_offset(instant).to_rfc3339(),
            "2024-01-15T21:00:00+09:00"
        );
    }

    #[test]
    fn keys_and_labels() {
        assert_eq!(normalize_key("Europe/Dublin"), "europe-dublin");
        assert_eq!(
            normalize_key("America/Argentina/Buenos_Aires"),
            "america-argentina-buenos_aires"
        );
        assert_eq!(display_name("LOCAL"), "Local time");
        assert_eq!(display_name("Europe/Dublin"), "Dublin");
        assert_eq!(
            display_name("America/Argentina/Buenos_Aires"),
            "Argentina - Buenos Aires"
        );
        assert_eq!(display_name("UTC"), "UTC");
    }

    #[test]
    fn lists_known_zones() {
        let zones: Vec<&str> = available_zones().collect();
        assert!(zones.contains(&"Europe/Dublin"));
        assert!(zones.iter().all(|zone| zone.parse::<Zone>().is_ok()));
    }

    #[test]
    fn completes_zone_prefixes() {
        assert_eq!(complete("europe/dubl"), Some("Europe/Dublin"));
        assert_eq!(complete("Asia/Tok"), Some("Asia/Tokyo"));
        assert_eq!(complete("Nowhere/"), None);
    }
}
