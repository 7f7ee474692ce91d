//! File Refinement - simulation core of a number-grid refinement minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wrapping grid, hazards, sensor, progress)
//! - `settings`: Tunable gameplay constants
//! - `clock`: Injected time sources

pub mod clock;
pub mod settings;
pub mod sim;

pub use clock::{Clock, ManualClock, SystemClock};
pub use settings::{Settings, SettingsError};
pub use sim::{EventQueue, Terminal, TerminalEvent, TerminalHooks};

/// Game configuration constants
pub mod consts {
    /// Global grid dimensions (the grid wraps at its edges)
    pub const DEFAULT_GRID_WIDTH: u32 = 1000;
    pub const DEFAULT_GRID_HEIGHT: u32 = 1000;
    /// Largest supported grid side
    pub const MAX_GRID_SIDE: u32 = 1 << 15;

    /// Visible window
    pub const DEFAULT_VIEWPORT_COLS: u32 = 10;
    pub const DEFAULT_VIEWPORT_ROWS: u32 = 10;

    /// One hazard spawns per sector
    pub const DEFAULT_SECTOR_SIZE: u32 = 50;
    /// Keeps spawned hazards away from sector edges
    pub const DEFAULT_SECTOR_MARGIN: u32 = 5;

    /// Trackball input to scroll units
    pub const DEFAULT_SCROLL_SENSITIVITY: f32 = 0.5;

    /// Progress per point of tile value (a 9 is worth 0.045)
    pub const DEFAULT_VALUE_SCALE: f32 = 0.005;
    /// Hazard tiles are worth this much more
    pub const DEFAULT_HAZARD_MULTIPLIER: f32 = 4.0;
    /// Chunks land on a bar scaled by this
    pub const DEFAULT_CHUNK_MULTIPLIER: f32 = 1.5;
    /// Seconds a bar cools after filling up
    pub const DEFAULT_COOLDOWN_SECS: f32 = 2.5;
    pub const DEFAULT_FILES_PER_DAY: u32 = 2;
    /// Cap on hazard activations caught up in a single `advance`
    pub const MAX_STRESS_STEPS: u32 = 8;

    /// Proximity sensor range in tiles
    pub const DEFAULT_SENSOR_MAX_DISTANCE: f32 = 15.0;
    /// Tiles scanned past each viewport edge
    pub const DEFAULT_SENSOR_SEARCH_MARGIN: i32 = 16;
}
