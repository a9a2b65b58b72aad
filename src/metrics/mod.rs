//! Training zones.

pub mod zones;

pub use zones::{Zone, ZoneError, ZoneLookup, ZoneSchedule, ZoneTable};
