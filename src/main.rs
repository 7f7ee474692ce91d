//! File Refinement headless demo
//!
//! Plays one workday automatically and logs every notification. Run with
//! `RUST_LOG=info` (or `debug`) to see the session; pass a seed as the first
//! argument for a different grid.

use file_refinement::sim::BAR_COUNT;
use file_refinement::{ManualClock, Settings, Terminal, TerminalEvent, TerminalHooks};

/// Simulated seconds per demo step
const STEP_SECS: f32 = 0.5;
/// Give up if the day hasn't finished by then
const MAX_STEPS: u32 = 10_000;
/// Tiles below this value are left on the grid
const MIN_TILE_VALUE: u8 = 6;

/// Logs notifications instead of drawing them
#[derive(Default)]
struct LogHooks {
    files_done: u32,
}

impl TerminalHooks for LogHooks {
    fn on_event(&mut self, event: &TerminalEvent) {
        match event {
            TerminalEvent::ViewportChanged | TerminalEvent::ChunkConsumed => {}
            TerminalEvent::BarUpdated { index, value } => {
                log::debug!("Bar {} at {:.0}%", index, value * 100.0)
            }
            TerminalEvent::FileCompleted { done, target } => {
                self.files_done = *done;
                log::info!("File {}/{} complete", done, target);
            }
            TerminalEvent::DayCompleted { duration } => {
                log::info!("Day completed after {:.1}s", duration)
            }
            other => log::debug!("{:?}", other),
        }
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("File Refinement (headless) starting with seed: {}", seed);

    let clock = ManualClock::new(0.0);
    let mut terminal = match Terminal::new(
        Settings::default(),
        seed,
        LogHooks::default(),
        Box::new(clock.clone()),
    ) {
        Ok(terminal) => terminal,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            return;
        }
    };

    terminal.start_day();

    let mut steps = 0;
    while terminal.day().is_active() && steps < MAX_STEPS {
        steps += 1;
        clock.advance(STEP_SECS as f64);
        terminal.advance(STEP_SECS);

        // Wander diagonally, drifting faster when danger is high
        let drift = 1.0 + terminal.proximity();
        terminal.scroll(-3.0 * drift, -1.0);

        let Some(bar) = (0..BAR_COUNT).find(|&i| !terminal.is_bar_full(i)) else {
            continue;
        };
        let tiles: Vec<usize> = terminal
            .visible_values()
            .iter()
            .enumerate()
            .filter(|&(i, &v)| v >= MIN_TILE_VALUE || terminal.is_screen_hazard(i))
            .map(|(i, _)| i)
            .collect();
        let chunk = terminal.drop_selection(&tiles, bar);
        log::debug!(
            "Step {}: dropped {} tiles on bar {} (+{:.3}), master {:.0}%",
            steps,
            tiles.len(),
            bar,
            chunk,
            terminal.master_progress() * 100.0
        );
    }

    println!(
        "Refined {} of {} files in {} steps",
        terminal.hooks().files_done,
        terminal.day().files_per_day,
        steps
    );
}
