//! Application-level configuration constants.

// Persistence
pub const STORAGE_KEY: &str = "workouts";
pub const LEGACY_STORAGE_KEY: &str = "workout";
pub const SCHEMA_VERSION: u32 = 1;

// Map
pub const MAP_CONTAINER_ID: &str = "map";
pub const MAP_ZOOM: u8 = 15;
pub const FOCUS_ZOOM: u8 = 16;
pub const PAN_DURATION_SECS: f64 = 1.0;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

// Marker popups
pub const POPUP_MAX_WIDTH: u32 = 240;
pub const POPUP_MIN_WIDTH: u32 = 120;

// UI behavior
pub const FORM_REVEAL_DELAY_MS: u32 = 1000;
pub const GEOLOCATION_TIMEOUT_MS: u32 = 10_000;
