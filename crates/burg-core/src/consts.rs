//! Generator constants
//!
//! Defaults used by [`crate::GenOptions`] and by the generators that are
//! not worth exposing as options.

/// Default city dimensions
pub const CITY_WIDTH: i32 = 160;
pub const CITY_HEIGHT: i32 = 100;

/// Room leaf bounds (floor area, walls excluded)
pub const ROOM_MIN: i32 = 5;
pub const ROOM_MAX: i32 = 10;

/// Block bounds for lux buildings
pub const BLOCK_MIN: i32 = 15;
pub const BLOCK_MAX: i32 = 20;

/// District bounds
pub const DISTRICT_MIN: i32 = 16;
pub const DISTRICT_MAX: i32 = 40;

/// Radius fractions used to band districts around the city centre
pub const RAD_LUX: f64 = 0.22;
pub const RAD_INNER: f64 = 0.33;
pub const RAD_GOOD: f64 = 0.55;
pub const RAD_OUTER: f64 = 0.66;

/// Family composition rolls (percent)
pub const SPOUSE_CHANCE: u32 = 60;
pub const CHILD_CHANCES: [u32; 3] = [40, 20, 10];

/// Random tries before a free location search falls back to a scan
pub const FREE_LOCATION_TRIES: u32 = 50;
