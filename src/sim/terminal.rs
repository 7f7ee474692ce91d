//! The refinement terminal
//!
//! Owns the grid, hazards, viewport, sensor and ledger, plus the seeded RNG and
//! the injected clock. Every inbound gameplay call goes through here, and every
//! notification leaves through the host's [`TerminalHooks`].

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::{EventQueue, TerminalEvent, TerminalHooks};
use super::grid::{ToroidalGrid, is_prime};
use super::hazard::HazardField;
use super::ledger::{DayState, ProgressLedger};
use super::sensor::ProximitySensor;
use super::viewport::Viewport;
use crate::clock::{Clock, SystemClock};
use crate::consts::MAX_STRESS_STEPS;
use crate::settings::{Settings, SettingsError};

pub struct Terminal<H: TerminalHooks = EventQueue> {
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    grid: ToroidalGrid,
    hazards: HazardField,
    viewport: Viewport,
    sensor: ProximitySensor,
    ledger: ProgressLedger,
    clock: Box<dyn Clock>,
    hooks: H,
    /// Seconds since the last automatic hazard activation
    stress_timer: f32,
}

impl Terminal<EventQueue> {
    /// Default settings, wall clock, events recorded in an [`EventQueue`]
    pub fn with_seed(seed: u64) -> Self {
        Self::build(
            Settings::default(),
            seed,
            EventQueue::new(),
            Box::new(SystemClock::new()),
        )
    }
}

impl<H: TerminalHooks> Terminal<H> {
    /// Create a terminal and generate its first grid
    pub fn new(
        settings: Settings,
        seed: u64,
        hooks: H,
        clock: Box<dyn Clock>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings, seed, hooks, clock))
    }

    fn build(settings: Settings, seed: u64, hooks: H, clock: Box<dyn Clock>) -> Self {
        let grid = ToroidalGrid::new(settings.grid_width, settings.grid_height);
        let viewport = Viewport::new(
            settings.viewport_cols,
            settings.viewport_rows,
            grid.width(),
            grid.height(),
        );
        let mut terminal = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            hazards: HazardField::new(settings.sector_size, settings.sector_margin),
            sensor: ProximitySensor {
                max_distance: settings.sensor_max_distance,
                search_margin: i32::try_from(settings.sensor_search_margin).unwrap_or(i32::MAX),
            },
            ledger: ProgressLedger::new(
                settings.files_per_day,
                settings.cooldown_secs,
                settings.chunk_multiplier,
            ),
            grid,
            viewport,
            settings,
            clock,
            hooks,
            stress_timer: 0.0,
        };
        log::info!("Terminal initialized with seed: {}", seed);
        terminal.regenerate();
        terminal
    }

    fn emit(&mut self, event: TerminalEvent) {
        self.hooks.on_event(&event);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &ToroidalGrid {
        &self.grid
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    pub fn day(&self) -> &DayState {
        self.ledger.day()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    // === Grid ===

    /// New values everywhere and a fresh hazard per sector
    pub fn regenerate(&mut self) {
        self.grid.regenerate(&mut self.rng);
        self.hazards.reseed(&mut self.grid, &mut self.rng);
        log::info!(
            "Grid generated: {}x{}, {} hazards",
            self.grid.width(),
            self.grid.height(),
            self.grid.hazard_count()
        );
        self.emit(TerminalEvent::ViewportChanged);
    }

    pub fn value_at(&self, x: i32, y: i32) -> u8 {
        self.grid.value_at(x, y)
    }

    pub fn is_hazard(&self, global_index: usize) -> bool {
        self.hazards.is_hazard(&self.grid, global_index)
    }

    /// Whether a visible tile is a hazard (false outside the window)
    pub fn is_screen_hazard(&self, screen_index: usize) -> bool {
        self.viewport
            .screen_to_global(screen_index)
            .is_some_and(|idx| self.grid.is_hazard(idx))
    }

    pub fn screen_to_global(&self, screen_index: usize) -> Option<usize> {
        self.viewport.screen_to_global(screen_index)
    }

    /// Values of the visible window, row-major
    pub fn visible_values(&self) -> Vec<u8> {
        self.viewport
            .visible_indices()
            .into_iter()
            .map(|idx| self.grid.value_at_index(idx))
            .collect()
    }

    /// Global indices of visible tiles holding a prime value
    pub fn visible_prime_indices(&self) -> Vec<usize> {
        self.viewport
            .visible_indices()
            .into_iter()
            .filter(|&idx| is_prime(self.grid.value_at_index(idx)))
            .collect()
    }

    pub fn group_3x3(&self, global_index: usize) -> Vec<usize> {
        self.grid.group_3x3(global_index)
    }

    // === Hazards ===

    /// Turn one of `candidates` into a hazard
    pub fn highlight_random_hazard(&mut self, candidates: &[usize]) -> Option<usize> {
        let index = self
            .hazards
            .activate_one(&mut self.grid, candidates, &mut self.rng)?;
        log::debug!("Hazard activated at global index {}", index);
        self.emit(TerminalEvent::HazardActivated { index });
        self.emit(TerminalEvent::ViewportChanged);
        Some(index)
    }

    /// Turn a visible prime tile into a hazard
    pub fn highlight_random_prime(&mut self) -> Option<usize> {
        let candidates = self.visible_prime_indices();
        self.highlight_random_hazard(&candidates)
    }

    pub fn proximity(&self) -> f32 {
        self.sensor.proximity(&self.grid, &self.viewport)
    }

    // === Viewport ===

    /// Apply trackball input at the configured sensitivity
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.viewport
            .scroll(dx, dy, self.settings.scroll_sensitivity);
        self.emit(TerminalEvent::ViewportChanged);
    }

    pub fn set_scroll(&mut self, x: i32, y: i32) {
        self.viewport.set_scroll(x, y);
        self.emit(TerminalEvent::ViewportChanged);
    }

    // === Progress ===

    pub fn bar_fill(&self, index: usize) -> f32 {
        self.ledger.fill(index)
    }

    pub fn is_bar_available(&self, index: usize) -> bool {
        self.ledger.is_available(index)
    }

    pub fn is_bar_full(&self, index: usize) -> bool {
        self.ledger.is_full(index)
    }

    pub fn master_progress(&self) -> f32 {
        self.ledger.master_progress()
    }

    pub fn cooldown_ratio(&self, index: usize) -> f32 {
        self.ledger.cooldown_ratio(index)
    }

    /// Eat the given screen tiles and feed their value to a bar.
    ///
    /// Each tile is worth `value * value_scale`, multiplied for hazards (which
    /// are consumed). Eaten tiles get fresh values. Returns the chunk value, or
    /// 0.0 when the drop was rejected (no active day, invalid or full bar), in
    /// which case nothing is eaten.
    pub fn drop_selection(&mut self, tiles: &[usize], bar_index: usize) -> f32 {
        if !self.ledger.accepts_chunk(bar_index) {
            log::debug!("Drop on bar {} rejected", bar_index);
            return 0.0;
        }

        let mut total = 0.0;
        let mut cleared = Vec::with_capacity(tiles.len());
        for &screen_index in tiles {
            let Some(idx) = self.viewport.screen_to_global(screen_index) else {
                continue;
            };
            let mut contribution = self.grid.value_at_index(idx) as f32 * self.settings.value_scale;
            if self.hazards.consume(&mut self.grid, idx, &mut self.rng) {
                contribution *= self.settings.hazard_multiplier;
            } else {
                self.grid.refresh_cell(idx, &mut self.rng);
            }
            total += contribution;
            cleared.push(idx);
        }

        if !cleared.is_empty() {
            self.emit(TerminalEvent::GroupCleared { indices: cleared });
        }
        self.ledger.stage_chunk(total);
        self.emit(TerminalEvent::ChunkReady { value: total });
        self.apply_chunk(bar_index);
        self.emit(TerminalEvent::ViewportChanged);
        total
    }

    /// Apply whatever chunk is pending to a bar
    pub fn apply_chunk(&mut self, bar_index: usize) -> bool {
        let now = self.clock.now_secs();
        self.ledger.apply_chunk(bar_index, now, &mut self.hooks)
    }

    pub fn reset_bars(&mut self) {
        self.ledger.reset_bars(&mut self.hooks);
    }

    // === Day ===

    /// Start a workday on a freshly generated grid
    pub fn start_day(&mut self) {
        let now = self.clock.now_secs();
        self.regenerate();
        self.stress_timer = 0.0;
        self.ledger.start_day(now, &mut self.hooks);
    }

    pub fn end_day(&mut self) {
        let now = self.clock.now_secs();
        self.ledger.end_day(now, &mut self.hooks);
    }

    /// Advance timed behaviour: bar cooldowns and, while a day runs, periodic
    /// hazard escalation.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.ledger.advance(dt, &mut self.hooks);

        let interval = self.settings.stress_interval_secs;
        if interval <= 0.0 || !self.ledger.day().is_active() {
            return;
        }
        self.stress_timer += dt;
        if self.stress_timer < interval {
            return;
        }
        // Float-to-int casts saturate
        let due = (self.stress_timer / interval).floor() as u32;
        self.stress_timer %= interval;
        if !self.stress_timer.is_finite() {
            self.stress_timer = 0.0;
        }

        // Long pauses are not replayed in full
        let steps = due.min(MAX_STRESS_STEPS);
        if steps < due {
            log::debug!("Skipping {} stress steps", due - steps);
        }
        for _ in 0..steps {
            if self.highlight_random_prime().is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sim::ledger::{BAR_COUNT, DayPhase};

    fn test_terminal(settings: Settings) -> (Terminal, ManualClock) {
        let clock = ManualClock::new(0.0);
        let terminal =
            Terminal::new(settings, 12345, EventQueue::new(), Box::new(clock.clone())).unwrap();
        (terminal, clock)
    }

    fn small() -> Settings {
        Settings::with_grid(100, 100)
    }

    /// Make every visible tile a 9 and drop the whole window on a bar
    fn drop_full_window(term: &mut Terminal, bar: usize) -> f32 {
        for idx in term.viewport.visible_indices() {
            let (x, y) = term.grid.coords_of(idx).unwrap();
            term.grid.set_value(x, y, 9);
        }
        let tiles: Vec<usize> = (0..term.viewport.tile_count()).collect();
        term.drop_selection(&tiles, bar)
    }

    fn count(term: &Terminal, pred: impl Fn(&TerminalEvent) -> bool) -> usize {
        term.hooks().count(pred)
    }

    #[test]
    fn test_new_generates_grid() {
        let (term, _) = test_terminal(Settings::with_grid(230, 120));
        assert!((0..term.grid.len()).all(|i| (1..=9).contains(&term.grid.value_at_index(i))));
        let hazards = term.grid.hazard_count();
        assert!(hazards >= 1 && hazards <= 5 * 3);
        assert_eq!(term.viewport().scroll_pos(), (115, 60));
        assert_eq!(term.hooks().events().to_vec(), vec![TerminalEvent::ViewportChanged]);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let result = Terminal::new(
            Settings::with_grid(0, 0),
            1,
            (),
            Box::new(ManualClock::default()),
        );
        assert!(matches!(result, Err(SettingsError::InvalidGrid { .. })));

        let mut settings = small();
        settings.sector_size = 3_000_000_000;
        let result = Terminal::new(settings, 1, (), Box::new(ManualClock::default()));
        assert!(matches!(result, Err(SettingsError::InvalidSectorSize { .. })));
    }

    #[test]
    fn test_with_seed_uses_defaults() {
        let term = Terminal::with_seed(7);
        assert_eq!(term.seed(), 7);
        assert_eq!(term.grid().len(), 1000 * 1000);
        assert_eq!(term.grid().hazard_count(), 20 * 20);
        assert_eq!(term.viewport().scroll_pos(), (500, 500));
        assert_eq!(term.visible_values().len(), 100);
    }

    #[test]
    fn test_screen_queries() {
        let (mut term, _) = test_terminal(small());
        term.set_scroll(98, 0);
        // Screen (2, 1) wraps to global (0, 1)
        assert_eq!(term.screen_to_global(12), Some(100));
        assert_eq!(term.screen_to_global(100), None);
        assert!(!term.is_screen_hazard(100));

        term.grid.set_hazard(100, true);
        assert!(term.is_screen_hazard(12));
        assert_eq!(term.group_3x3(100), vec![0, 1, 100, 101, 200, 201]);
    }

    #[test]
    fn test_same_seed_same_grid() {
        let (a, _) = test_terminal(small());
        let (b, _) = test_terminal(small());
        assert_eq!(a.grid.hazard_indices(), b.grid.hazard_indices());
        assert_eq!(a.visible_values(), b.visible_values());
    }

    #[test]
    fn test_drop_hazard_tile() {
        let (mut term, _) = test_terminal(small());
        term.start_day();
        term.set_scroll(0, 0);
        term.grid.set_value(0, 0, 9);
        term.grid.set_hazard(0, true);
        term.hooks_mut().clear();

        let chunk = term.drop_selection(&[0], 2);

        assert!((chunk - 0.18).abs() < 1e-6);
        assert!(!term.is_hazard(0));
        assert!(!term.is_screen_hazard(0));
        assert!((term.bar_fill(2) - 0.27).abs() < 1e-6);
        assert_eq!(term.ledger().pending_chunk(), 0.0);
        assert!(term
            .hooks()
            .events()
            .contains(&TerminalEvent::GroupCleared { indices: vec![0] }));
        assert_eq!(
            count(&term, |e| matches!(e, TerminalEvent::ChunkReady { .. })),
            1
        );
    }

    #[test]
    fn test_drop_plain_tiles_in_order() {
        let (mut term, _) = test_terminal(small());
        term.start_day();
        term.set_scroll(0, 0);
        for i in 0..3 {
            term.grid.set_hazard(i, false);
        }
        term.grid.set_value(0, 0, 5);
        term.grid.set_value(1, 0, 2);

        // 100 is outside the window and ignored
        let chunk = term.drop_selection(&[1, 100, 0], 0);
        assert!((chunk - 7.0 * 0.005).abs() < 1e-6);
        assert!(term
            .hooks()
            .events()
            .contains(&TerminalEvent::GroupCleared {
                indices: vec![1, 0]
            }));
    }

    #[test]
    fn test_drop_rejected_up_front() {
        let (mut term, _) = test_terminal(small());
        term.set_scroll(0, 0);
        term.grid.set_value(0, 0, 9);
        term.grid.set_hazard(0, true);
        term.hooks_mut().clear();

        // No day running
        assert_eq!(term.drop_selection(&[0], 0), 0.0);
        assert!(term.is_hazard(0));
        assert_eq!(term.value_at(0, 0), 9);
        assert!(term.hooks().events().is_empty());

        // Invalid bar
        term.start_day();
        term.set_scroll(0, 0);
        term.grid.set_hazard(0, true);
        assert_eq!(term.drop_selection(&[0], BAR_COUNT), 0.0);
        assert!(term.is_hazard(0));
    }

    #[test]
    fn test_scroll_uses_sensitivity() {
        let (mut term, _) = test_terminal(small());
        term.set_scroll(0, 0);
        term.hooks_mut().clear();
        for _ in 0..10 {
            term.scroll(1.0, 0.0);
        }
        assert_eq!(term.viewport().scroll_pos(), (95, 0));
        assert_eq!(count(&term, |e| *e == TerminalEvent::ViewportChanged), 10);
    }

    #[test]
    fn test_highlight_random_prime() {
        let (mut term, _) = test_terminal(small());
        term.set_scroll(0, 0);
        for idx in term.viewport.visible_indices() {
            let (x, y) = term.grid.coords_of(idx).unwrap();
            term.grid.set_value(x, y, 4);
            term.grid.set_hazard(idx, false);
        }
        term.grid.set_value(3, 2, 7);
        let target = term.grid.index_of(3, 2);
        assert_eq!(term.visible_prime_indices(), vec![target]);

        assert_eq!(term.highlight_random_prime(), Some(target));
        assert!(term
            .hooks()
            .events()
            .contains(&TerminalEvent::HazardActivated { index: target }));
        // Already a hazard
        assert_eq!(term.highlight_random_prime(), None);
        assert_eq!(term.highlight_random_hazard(&[]), None);
    }

    #[test]
    fn test_stress_timer_escalates_during_day() {
        let mut settings = small();
        settings.stress_interval_secs = 1.0;
        let (mut term, _) = test_terminal(settings);
        let activations =
            |t: &Terminal| count(t, |e| matches!(e, TerminalEvent::HazardActivated { .. }));

        // Idle: nothing happens
        term.advance(5.0);
        assert_eq!(activations(&term), 0);

        term.start_day();
        term.set_scroll(0, 0);
        for idx in term.viewport.visible_indices() {
            let (x, y) = term.grid.coords_of(idx).unwrap();
            term.grid.set_value(x, y, 3);
            term.grid.set_hazard(idx, false);
        }
        term.advance(0.5);
        assert_eq!(activations(&term), 0);
        term.advance(2.6);
        assert_eq!(activations(&term), 3);
    }

    #[test]
    fn test_stress_catch_up_is_bounded() {
        let mut settings = small();
        settings.stress_interval_secs = 1.0;
        let (mut term, _) = test_terminal(settings);
        term.start_day();
        term.set_scroll(0, 0);
        for idx in term.viewport.visible_indices() {
            let (x, y) = term.grid.coords_of(idx).unwrap();
            term.grid.set_value(x, y, 5);
            term.grid.set_hazard(idx, false);
        }
        term.hooks_mut().clear();

        term.advance(1.0e8);
        let activations = count(&term, |e| matches!(e, TerminalEvent::HazardActivated { .. }));
        assert_eq!(activations, MAX_STRESS_STEPS as usize);
        assert!(term.stress_timer < 1.0);

        // Bad time steps change nothing
        term.hooks_mut().clear();
        term.advance(f32::NAN);
        term.advance(f32::INFINITY);
        assert!(term.hooks().events().is_empty());
        assert!(term.stress_timer < 1.0);

        // The largest finite step still leaves a usable timer
        term.advance(f32::MAX);
        term.advance(f32::MAX);
        assert_eq!(term.stress_timer, 0.0);
    }

    #[test]
    fn test_proximity_tracks_viewport() {
        let (mut term, _) = test_terminal(small());
        for i in 0..term.grid.len() {
            term.grid.set_hazard(i, false);
        }
        assert_eq!(term.proximity(), 0.0);

        term.set_scroll(40, 40);
        let idx = term.grid.index_of(44, 44);
        term.grid.set_hazard(idx, true);
        assert!(term.proximity() > 0.9);

        // Scroll 30 tiles away: out of range
        term.set_scroll(70, 40);
        assert_eq!(term.proximity(), 0.0);
    }

    #[test]
    fn test_bar_cooldown_via_advance() {
        let (mut term, _) = test_terminal(small());
        term.start_day();
        drop_full_window(&mut term, 1);
        assert!(term.is_bar_full(1));
        assert!(!term.is_bar_available(1));
        assert_eq!(term.cooldown_ratio(1), 1.0);

        term.advance(term.settings().cooldown_secs);
        assert_eq!(term.cooldown_ratio(1), 0.0);
        // Still full, so still unavailable
        assert!(!term.is_bar_available(1));
        assert_eq!(
            count(&term, |e| *e == TerminalEvent::BarCooldownEnded { index: 1 }),
            1
        );
    }

    #[test]
    fn test_full_day() {
        let (mut term, clock) = test_terminal(small());
        clock.set(100.0);
        term.start_day();
        assert_eq!(term.day().phase, DayPhase::Active);
        term.hooks_mut().clear();

        // First file
        for bar in 0..BAR_COUNT {
            assert!(drop_full_window(&mut term, bar) > 0.0);
        }
        let files = |t: &Terminal| {
            t.hooks()
                .events()
                .iter()
                .filter_map(|e| match e {
                    TerminalEvent::FileCompleted { done, target } => Some((*done, *target)),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(files(&term), vec![(1, 2)]);
        assert_eq!(term.master_progress(), 0.0);
        assert_eq!(count(&term, |e| *e == TerminalEvent::FileSelectionRequested), 1);

        // Second file finishes the day
        clock.set(130.0);
        for bar in 0..BAR_COUNT {
            drop_full_window(&mut term, bar);
        }
        assert_eq!(files(&term), vec![(1, 2), (2, 2)]);
        assert_eq!(term.day().phase, DayPhase::Complete);
        assert_eq!(
            count(&term, |e| *e == TerminalEvent::DayCompleted { duration: 30.0 }),
            1
        );

        // A third round is ignored
        let before = term.hooks().events().len();
        for bar in 0..BAR_COUNT {
            assert_eq!(drop_full_window(&mut term, bar), 0.0);
        }
        assert_eq!(term.hooks().events().len(), before);
        assert_eq!(files(&term).len(), 2);
    }

    #[test]
    fn test_end_day_and_restart() {
        let (mut term, clock) = test_terminal(small());
        term.start_day();
        drop_full_window(&mut term, 0);
        clock.advance(12.0);
        term.end_day();
        assert!(term
            .hooks()
            .events()
            .contains(&TerminalEvent::DayCompleted { duration: 12.0 }));
        assert!(!term.day().is_active());

        term.start_day();
        assert!(term.day().is_active());
        assert_eq!(term.day().files_refined, 0);
        assert_eq!(term.master_progress(), 0.0);
    }
}
