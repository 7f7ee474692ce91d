//! Outbound notifications for the presentation layer
//!
//! The core never calls into a host object model directly. Hosts implement
//! [`TerminalHooks`] and override `on_event`; the default ignores everything.

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    /// Scroll position or visible values changed; redraw the window
    ViewportChanged,
    /// A bar's fill changed
    BarUpdated { index: usize, value: f32 },
    /// A drop produced a chunk, before it is applied
    ChunkReady { value: f32 },
    /// The pending chunk was applied to a bar
    ChunkConsumed,
    BarCooldownStarted { index: usize, duration: f32 },
    BarCooldownEnded { index: usize },
    FileCompleted { done: u32, target: u32 },
    /// More files remain today; the host should offer the next one
    FileSelectionRequested,
    DayStarted,
    /// Day finished (or was ended early), with its length in seconds
    DayCompleted { duration: f64 },
    AllBarsFull,
    /// Global indices of tiles eaten by a drop
    GroupCleared { indices: Vec<usize> },
    /// A cell was turned into a hazard for difficulty escalation
    HazardActivated { index: usize },
}

/// Host capability receiving core notifications
pub trait TerminalHooks {
    fn on_event(&mut self, _event: &TerminalEvent) {}
}

/// Headless hosts that don't care
impl TerminalHooks for () {}

/// Records every event in order
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<TerminalEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TerminalEvent] {
        &self.events
    }

    /// Take all recorded events, oldest first
    pub fn drain(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Count events matching a predicate
    pub fn count(&self, pred: impl Fn(&TerminalEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl TerminalHooks for EventQueue {
    fn on_event(&mut self, event: &TerminalEvent) {
        self.events.push(event.clone());
    }
}
