use chrono::{DateTime, Duration, Utc};

#[cfg(test)]
use std::cell::Cell;

/// Cadence of every clock's render loop.
pub fn tick_period() -> Duration {
    Duration::seconds(1)
}

/// Source of the current instant, swapped out for a manual one in tests.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualTime(Cell<DateTime<Utc>>);

#[cfg(test)]
impl ManualTime {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Cell::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.0.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl TimeSource for ManualTime {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

/// Handle on a periodic task. The host calls [`TickHandle::fire`] whenever it
/// wakes up; cancelling drops the pending tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    due: Option<DateTime<Utc>>,
}

impl TickHandle {
    pub fn schedule(&mut self, now: DateTime<Utc>) {
        self.due = Some(now + tick_period());
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_active(&self) -> bool {
        self.due.is_some()
    }

    #[cfg(test)]
    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due
    }

    /// Returns true when the tick is due at `now` and schedules the next one.
    /// A host that slept through several periods gets a single firing.
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        match self.due {
            Some(due) if now >= due => {
                let next = due + tick_period();
                self.due = Some(if next > now { next } else { now + tick_period() });
                true
            }
            _ => false,
        }
    }
}
