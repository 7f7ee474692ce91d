//! Terminal tuning settings
//!
//! Every gameplay constant the host may tweak lives here. Settings round-trip
//! through JSON; missing fields fall back to the defaults in [`crate::consts`].

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Grid dimensions must be positive and fit the index space
    InvalidGrid { width: u32, height: u32 },
    /// Viewport must be non-empty and no larger than the grid
    InvalidViewport { cols: u32, rows: u32 },
    /// Sector size must be positive and no larger than a grid side
    InvalidSectorSize { size: u32 },
    /// An integer tuning value exceeds its upper bound
    TooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },
    /// A float field was NaN, infinite or negative
    InvalidValue { field: &'static str, value: f32 },
    ZeroFilesPerDay,
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidGrid { width, height } => {
                write!(f, "grid {width}x{height} must be non-empty and at most {MAX_GRID_SIDE} per side")
            }
            SettingsError::InvalidViewport { cols, rows } => {
                write!(f, "viewport {cols}x{rows} must be non-empty and fit inside the grid")
            }
            SettingsError::InvalidSectorSize { size } => {
                write!(f, "sector_size {size} must be between 1 and {MAX_GRID_SIDE}")
            }
            SettingsError::TooLarge { field, value, max } => {
                write!(f, "{field} must be at most {max} (got {value})")
            }
            SettingsError::InvalidValue { field, value } => {
                write!(f, "{field} must be finite and non-negative (got {value})")
            }
            SettingsError::ZeroFilesPerDay => write!(f, "files_per_day must be positive"),
            SettingsError::Parse(msg) => write!(f, "invalid settings JSON: {msg}"),
        }
    }
}

impl Error for SettingsError {}

/// Terminal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Grid ===
    /// Global grid width (wraps around)
    pub grid_width: u32,
    /// Global grid height (wraps around)
    pub grid_height: u32,
    /// Visible window width
    pub viewport_cols: u32,
    /// Visible window height
    pub viewport_rows: u32,

    // === Hazards ===
    /// Hazard spawn granularity (one per sector)
    pub sector_size: u32,
    /// Minimum distance of a hazard from its sector edge
    pub sector_margin: u32,
    /// Seconds between automatic hazard activations (0 = off)
    pub stress_interval_secs: f32,

    // === Input ===
    /// Trackball input to scroll-unit scale
    pub scroll_sensitivity: f32,

    // === Progress ===
    /// Progress per point of tile value
    pub value_scale: f32,
    /// Bonus for eating a hazard tile
    pub hazard_multiplier: f32,
    /// Scale applied when a chunk lands on a bar
    pub chunk_multiplier: f32,
    /// Seconds a bar cools after filling up (0 = no cooldown)
    pub cooldown_secs: f32,
    pub files_per_day: u32,

    // === Sensor ===
    /// Tiles at which the proximity reading drops to zero
    pub sensor_max_distance: f32,
    /// Tiles scanned beyond each viewport edge
    pub sensor_search_margin: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            viewport_cols: DEFAULT_VIEWPORT_COLS,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,

            sector_size: DEFAULT_SECTOR_SIZE,
            sector_margin: DEFAULT_SECTOR_MARGIN,
            stress_interval_secs: 0.0,

            scroll_sensitivity: DEFAULT_SCROLL_SENSITIVITY,

            value_scale: DEFAULT_VALUE_SCALE,
            hazard_multiplier: DEFAULT_HAZARD_MULTIPLIER,
            chunk_multiplier: DEFAULT_CHUNK_MULTIPLIER,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            files_per_day: DEFAULT_FILES_PER_DAY,

            sensor_max_distance: DEFAULT_SENSOR_MAX_DISTANCE,
            sensor_search_margin: DEFAULT_SENSOR_SEARCH_MARGIN as u32,
        }
    }
}

impl Settings {
    /// Default settings on a smaller grid
    pub fn with_grid(width: u32, height: u32) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let grid_ok = |side: u32| (1..=MAX_GRID_SIDE).contains(&side);
        if !grid_ok(self.grid_width) || !grid_ok(self.grid_height) {
            return Err(SettingsError::InvalidGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.viewport_cols == 0
            || self.viewport_rows == 0
            || self.viewport_cols > self.grid_width
            || self.viewport_rows > self.grid_height
        {
            return Err(SettingsError::InvalidViewport {
                cols: self.viewport_cols,
                rows: self.viewport_rows,
            });
        }
        if !(1..=MAX_GRID_SIDE).contains(&self.sector_size) {
            return Err(SettingsError::InvalidSectorSize {
                size: self.sector_size,
            });
        }
        // Scanning past a full grid period finds nothing new
        let limits = [
            ("sector_margin", self.sector_margin, MAX_GRID_SIDE),
            (
                "sensor_search_margin",
                self.sensor_search_margin,
                self.grid_width.max(self.grid_height),
            ),
        ];
        for (field, value, max) in limits {
            if value > max {
                return Err(SettingsError::TooLarge { field, value, max });
            }
        }
        if self.files_per_day == 0 {
            return Err(SettingsError::ZeroFilesPerDay);
        }

        let floats = [
            ("stress_interval_secs", self.stress_interval_secs),
            ("scroll_sensitivity", self.scroll_sensitivity),
            ("value_scale", self.value_scale),
            ("hazard_multiplier", self.hazard_multiplier),
            ("chunk_multiplier", self.chunk_multiplier),
            ("cooldown_secs", self.cooldown_secs),
            ("sensor_max_distance", self.sensor_max_distance),
        ];
        for (field, value) in floats {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        // Plain struct of numbers; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
