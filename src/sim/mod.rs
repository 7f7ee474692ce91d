//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time comes from an injected clock or explicit `dt`
//! - No rendering, audio or platform dependencies

pub mod events;
pub mod grid;
pub mod hazard;
pub mod ledger;
pub mod sensor;
pub mod terminal;
pub mod viewport;

pub use events::{EventQueue, TerminalEvent, TerminalHooks};
pub use grid::{MAX_VALUE, MIN_VALUE, ToroidalGrid, is_prime, wrap};
pub use hazard::HazardField;
pub use ledger::{BAR_COUNT, DayPhase, DayState, ProgressBar, ProgressLedger};
pub use sensor::ProximitySensor;
pub use terminal::Terminal;
pub use viewport::Viewport;
