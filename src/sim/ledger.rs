//! Progress bars and the day/file state machine
//!
//! Four bars fill from dropped chunks. When their mean reaches 1.0 a file is
//! refined; after `files_per_day` files the day is complete.

use super::events::{TerminalEvent, TerminalHooks};
use crate::consts::{DEFAULT_CHUNK_MULTIPLIER, DEFAULT_COOLDOWN_SECS, DEFAULT_FILES_PER_DAY};

/// Number of progress bars
pub const BAR_COUNT: usize = 4;

/// A single progress bar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressBar {
    /// Fill level (0.0 to 1.0)
    pub fill: f32,
    /// Bar refuses input while cooling
    pub cooling: bool,
    /// Seconds left on the cooldown
    pub cooldown_remaining: f32,
}

impl ProgressBar {
    pub fn is_full(&self) -> bool {
        self.fill >= 1.0
    }
}

/// Where the workday is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayPhase {
    /// No day started yet
    #[default]
    Idle,
    /// Files are being refined
    Active,
    /// Quota met or day ended early
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayState {
    pub phase: DayPhase,
    pub files_per_day: u32,
    pub files_refined: u32,
    /// Clock reading when the day started
    pub day_start_time: f64,
}

impl DayState {
    pub fn is_active(&self) -> bool {
        self.phase == DayPhase::Active
    }
}

/// Bars, pending chunk and day bookkeeping
#[derive(Debug, Clone)]
pub struct ProgressLedger {
    bars: [ProgressBar; BAR_COUNT],
    pending_chunk: f32,
    /// How long a bar cools after filling up
    pub cooldown_secs: f32,
    /// Scale applied to a chunk when it lands on a bar
    pub chunk_multiplier: f32,
    day: DayState,
}

impl Default for ProgressLedger {
    fn default() -> Self {
        Self::new(DEFAULT_FILES_PER_DAY, DEFAULT_COOLDOWN_SECS, DEFAULT_CHUNK_MULTIPLIER)
    }
}

impl ProgressLedger {
    pub fn new(files_per_day: u32, cooldown_secs: f32, chunk_multiplier: f32) -> Self {
        Self {
            bars: [ProgressBar::default(); BAR_COUNT],
            pending_chunk: 0.0,
            cooldown_secs,
            chunk_multiplier,
            day: DayState {
                phase: DayPhase::Idle,
                files_per_day,
                files_refined: 0,
                day_start_time: 0.0,
            },
        }
    }

    pub fn bars(&self) -> &[ProgressBar; BAR_COUNT] {
        &self.bars
    }

    /// Fill of a bar (0.0 for an invalid index)
    pub fn fill(&self, index: usize) -> f32 {
        self.bars.get(index).map(|b| b.fill).unwrap_or(0.0)
    }

    pub fn day(&self) -> &DayState {
        &self.day
    }

    pub fn pending_chunk(&self) -> f32 {
        self.pending_chunk
    }

    pub fn has_pending_chunk(&self) -> bool {
        self.pending_chunk > 0.0
    }

    /// Replace the pending chunk (negative values are stored as 0)
    pub fn stage_chunk(&mut self, value: f32) {
        self.pending_chunk = value.max(0.0);
    }

    /// Mean of all bar fills
    pub fn master_progress(&self) -> f32 {
        let total: f32 = self.bars.iter().map(|b| b.fill).sum();
        (total / BAR_COUNT as f32).clamp(0.0, 1.0)
    }

    pub fn all_full(&self) -> bool {
        self.bars.iter().all(ProgressBar::is_full)
    }

    pub fn is_full(&self, index: usize) -> bool {
        self.bars.get(index).is_some_and(ProgressBar::is_full)
    }

    /// Not cooling and not full
    pub fn is_available(&self, index: usize) -> bool {
        self.bars
            .get(index)
            .is_some_and(|b| !b.cooling && !b.is_full())
    }

    /// Whether a chunk dropped on this bar would land
    pub fn accepts_chunk(&self, index: usize) -> bool {
        self.day.is_active() && index < BAR_COUNT && !self.is_full(index)
    }

    /// 1.0 when a cooldown just started, 0.0 when it is over
    pub fn cooldown_ratio(&self, index: usize) -> f32 {
        if self.cooldown_secs <= 0.0 {
            return 0.0;
        }
        self.bars
            .get(index)
            .map(|b| (b.cooldown_remaining / self.cooldown_secs).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Empty every bar. Cooldowns keep running.
    pub fn reset_bars<H: TerminalHooks + ?Sized>(&mut self, hooks: &mut H) {
        for (index, bar) in self.bars.iter_mut().enumerate() {
            bar.fill = 0.0;
            hooks.on_event(&TerminalEvent::BarUpdated { index, value: 0.0 });
        }
    }

    /// Apply the pending chunk to a bar. Returns true if it landed.
    pub fn apply_chunk<H: TerminalHooks + ?Sized>(
        &mut self,
        index: usize,
        now: f64,
        hooks: &mut H,
    ) -> bool {
        if !self.day.is_active() || self.pending_chunk <= 0.0 {
            return false;
        }
        let cooldown_secs = self.cooldown_secs;
        let Some(bar) = self.bars.get_mut(index) else {
            return false;
        };
        if bar.is_full() {
            return false;
        }

        bar.fill = (bar.fill + self.pending_chunk * self.chunk_multiplier).clamp(0.0, 1.0);
        let value = bar.fill;
        self.pending_chunk = 0.0;

        hooks.on_event(&TerminalEvent::ChunkConsumed);
        hooks.on_event(&TerminalEvent::BarUpdated { index, value });

        if bar.is_full() && cooldown_secs > 0.0 {
            bar.cooling = true;
            bar.cooldown_remaining = cooldown_secs;
            hooks.on_event(&TerminalEvent::BarCooldownStarted {
                index,
                duration: cooldown_secs,
            });
        }

        if self.master_progress() >= 1.0 {
            self.complete_file(now, hooks);
        }

        if self.all_full() {
            log::info!("All bars are full");
            hooks.on_event(&TerminalEvent::AllBarsFull);
        }

        true
    }

    fn complete_file<H: TerminalHooks + ?Sized>(&mut self, now: f64, hooks: &mut H) {
        self.day.files_refined += 1;
        let (done, target) = (self.day.files_refined, self.day.files_per_day);
        log::info!("File refined ({}/{})", done, target);
        hooks.on_event(&TerminalEvent::FileCompleted { done, target });

        if done >= target {
            self.day.phase = DayPhase::Complete;
            let duration = (now - self.day.day_start_time).max(0.0);
            log::info!("Day complete in {:.1}s", duration);
            hooks.on_event(&TerminalEvent::DayCompleted { duration });
        } else {
            self.reset_bars(hooks);
            hooks.on_event(&TerminalEvent::FileSelectionRequested);
        }
    }

    /// Begin a new day: counters and bars start from zero
    pub fn start_day<H: TerminalHooks + ?Sized>(&mut self, now: f64, hooks: &mut H) {
        self.day.phase = DayPhase::Active;
        self.day.day_start_time = now;
        self.day.files_refined = 0;
        self.pending_chunk = 0.0;
        self.reset_bars(hooks);
        log::info!("Day started ({} files to refine)", self.day.files_per_day);
        hooks.on_event(&TerminalEvent::DayStarted);
    }

    /// End the day early. Reports a zero duration if no day was running.
    pub fn end_day<H: TerminalHooks + ?Sized>(&mut self, now: f64, hooks: &mut H) {
        let duration = if self.day.is_active() {
            (now - self.day.day_start_time).max(0.0)
        } else {
            0.0
        };
        self.day.phase = DayPhase::Complete;
        log::info!(
            "Day ended ({}/{} files)",
            self.day.files_refined,
            self.day.files_per_day
        );
        hooks.on_event(&TerminalEvent::DayCompleted { duration });
    }

    /// Run bar cooldowns forward by `dt` seconds
    pub fn advance<H: TerminalHooks + ?Sized>(&mut self, dt: f32, hooks: &mut H) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for (index, bar) in self.bars.iter_mut().enumerate() {
            if !bar.cooling {
                continue;
            }
            bar.cooldown_remaining -= dt;
            if bar.cooldown_remaining <= 0.0 {
                bar.cooldown_remaining = 0.0;
                bar.cooling = false;
                hooks.on_event(&TerminalEvent::BarCooldownEnded { index });
            }
        }
    }
}
