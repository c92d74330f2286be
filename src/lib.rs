//! Live digital clocks for any number of IANA timezones, with a conversion
//! mode that pins every clock to the instant one of them reads a chosen time.

pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod registry;
pub mod segment;
pub mod store;
pub mod surface;
pub mod time;
pub mod widget;
pub mod zone;

pub use error::{ClockError, Result};
pub use registry::ClockRegistry;
pub use widget::{ClockWidget, FixedTime};
