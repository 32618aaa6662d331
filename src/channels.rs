//! Names of the channels produced by the built-in layouts.

/// Wheel speed in m/s.
pub const SPEED: &str = "speed";
/// Center of gravity speed in m/s, corrected for lean angle.
pub const CG_SPEED: &str = "cg_speed";
/// Power in W.
pub const POWER: &str = "power";
/// Cadence in rpm.
pub const CADENCE: &str = "cadence";
/// Yaw angle in degrees.
pub const YAW: &str = "yaw";
/// Air density in kg/m³.
pub const AIR_DENSITY: &str = "air_density";
/// Air temperature in °C.
pub const TEMPERATURE: &str = "temperature";
/// Cumulative wheel revolution count.
pub const WHEEL_REVOLUTIONS: &str = "wheel_revolutions";
/// Time of the last wheel event in s.
pub const WHEEL_EVENT_TIME: &str = "wheel_event_time";
/// Power meter event count.
pub const POWER_EVENT_COUNT: &str = "power_event_count";
/// Time of the last power event in s.
pub const POWER_EVENT_TIME: &str = "power_event_time";
