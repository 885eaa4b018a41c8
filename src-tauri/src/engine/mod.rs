use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
mod core;
mod scheduler;
pub use self::core::{format_time, select_interval, tally};
pub use self::scheduler::{run_tick_loop, Tick, TickHandle, TickScheduler, TokioScheduler};

pub const WORK_SECONDS: u64 = 25 * 60;
pub const SHORT_BREAK_SECONDS: u64 = 5 * 60;
pub const LONG_BREAK_SECONDS: u64 = 20 * 60;
/// The only repetition that gets a long break. Equality, not periodicity.
pub const LONG_BREAK_REPETITION: u64 = 8;
pub const CHECKMARK: char = '✔';
pub const IDLE_LABEL: &str = "Timer";
pub const IDLE_TIMER_TEXT: &str = "00:00";
pub const TICK_DELAY: Duration = Duration::from_secs(1);

/// Engine shared between Tauri commands and the tick loop
pub type SharedEngine<S> = Arc<Mutex<PomodoroEngine<S>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn duration_seconds(self) -> u64 {
        match self {
            IntervalKind::Work => WORK_SECONDS,
            IntervalKind::ShortBreak => SHORT_BREAK_SECONDS,
            IntervalKind::LongBreak => LONG_BREAK_SECONDS,
        }
    }

    /// Text of the interval-name label
    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::Work => "Work",
            IntervalKind::ShortBreak | IntervalKind::LongBreak => "Break",
        }
    }

    pub fn accent(self) -> Accent {
        match self {
            IntervalKind::Work => Accent::Work,
            IntervalKind::ShortBreak => Accent::ShortBreak,
            IntervalKind::LongBreak => Accent::LongBreak,
        }
    }
}

/// Interval derived from the repetition counter, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub kind: IntervalKind,
    pub duration_seconds: u64,
}

impl From<IntervalKind> for Interval {
    fn from(kind: IntervalKind) -> Self {
        Self {
            kind,
            duration_seconds: kind.duration_seconds(),
        }
    }
}

/// Label color state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Idle,
    Work,
    ShortBreak,
    LongBreak,
}

impl Accent {
    pub fn color(self) -> &'static str {
        match self {
            Accent::Idle => "#9bdeac",
            Accent::Work => "#e7305b",
            Accent::ShortBreak => "#e2979c",
            Accent::LongBreak => "#9bdeac",
        }
    }
}

/// Counter and pending tick. Only start/reset touch `repetition_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub repetition_count: u64,
    /// Handle of the tick currently scheduled, kept for cancellation
    pub pending_tick: Option<TickHandle>,
}

/// Timer FSM: Idle -> Running -> Running (next interval) ... -> Idle on reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { kind: IntervalKind, remaining: u64 },
}

/// What the window shows right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub label: String,
    pub accent: Accent,
    pub timer_text: String,
    pub tally: String,
}

impl DisplayModel {
    pub fn idle() -> Self {
        Self {
            label: IDLE_LABEL.to_string(),
            accent: Accent::Idle,
            timer_text: IDLE_TIMER_TEXT.to_string(),
            tally: String::new(),
        }
    }
}

/// Pomodoro engine: session state, FSM and display, driven by a `TickScheduler`.
/// Not internally synchronized; share it through `SharedEngine`.
pub struct PomodoroEngine<S: TickScheduler> {
    pub(crate) session: SessionState,
    pub(crate) state: TimerState,
    pub(crate) display: DisplayModel,
    pub(crate) scheduler: S,
    pub(crate) tick_delay: Duration,
}

/// Snapshot for the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStateResponse {
    #[serde(flatten)]
    pub state: TimerStateForAPI,
    pub repetition_count: u64,
    pub label: String,
    /// Hex color of the label
    pub accent: String,
    pub timer_text: String,
    pub tally: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(tag = "state")]
pub enum TimerStateForAPI {
    Idle,
    Running {
        kind: IntervalKind,
        remaining_seconds: u64,
    },
}

impl From<TimerState> for TimerStateForAPI {
    fn from(state: TimerState) -> Self {
        match state {
            TimerState::Idle => TimerStateForAPI::Idle,
            TimerState::Running { kind, remaining } => TimerStateForAPI::Running {
                kind,
                remaining_seconds: remaining,
            },
        }
    }
}

impl<S: TickScheduler> PomodoroEngine<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_tick_delay(scheduler, TICK_DELAY)
    }

    pub fn with_tick_delay(scheduler: S, tick_delay: Duration) -> Self {
        Self {
            session: SessionState::default(),
            state: TimerState::Idle,
            display: DisplayModel::idle(),
            scheduler,
            tick_delay,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn timer_state(&self) -> TimerState {
        self.state
    }

    pub fn display(&self) -> &DisplayModel {
        &self.display
    }
}
