use crate::engine::{
    DisplayModel, Interval, IntervalKind, PomodoroEngine, Tick, TickScheduler, TimerState,
    TimerStateResponse, CHECKMARK, LONG_BREAK_REPETITION,
};
use tracing::{debug, info};

/// Interval for a repetition count (already incremented).
/// Odd -> Work, exactly 8 -> LongBreak, any other even -> ShortBreak.
pub fn select_interval(repetition_count: u64) -> Interval {
    let kind = if repetition_count % 2 == 1 {
        IntervalKind::Work
    } else if repetition_count == LONG_BREAK_REPETITION {
        IntervalKind::LongBreak
    } else {
        IntervalKind::ShortBreak
    };
    Interval::from(kind)
}

/// `minutes:seconds`, seconds padded to two digits, minutes not padded
pub fn format_time(remaining_seconds: u64) -> String {
    format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// One checkmark per completed work interval: ceil(repetition_count / 2)
pub fn tally(repetition_count: u64) -> String {
    let marks = repetition_count.div_ceil(2) as usize;
    std::iter::repeat(CHECKMARK).take(marks).collect()
}

impl<S: TickScheduler> PomodoroEngine<S> {
    /// Idle/Running -> Running(next interval).
    /// A tick still pending (Start pressed mid-countdown) is superseded.
    pub fn start_timer(&mut self) -> Interval {
        if let Some(handle) = self.session.pending_tick.take() {
            debug!("[TIMER] Superseding pending tick {:?}", handle);
            self.scheduler.cancel(handle);
        }

        self.session.repetition_count += 1;
        let interval = select_interval(self.session.repetition_count);
        info!(
            "[TIMER] Repetition {}: {:?} for {}s",
            self.session.repetition_count, interval.kind, interval.duration_seconds
        );

        self.display.label = interval.kind.label().to_string();
        self.display.accent = interval.kind.accent();
        self.count_down(interval.kind, interval.duration_seconds);
        interval
    }

    /// Render `remaining`, then either schedule the next tick or roll into the next interval
    fn count_down(&mut self, kind: IntervalKind, remaining: u64) {
        self.display.timer_text = format_time(remaining);
        self.state = TimerState::Running { kind, remaining };

        if remaining > 0 {
            let handle = self.scheduler.schedule(self.tick_delay, remaining - 1);
            self.session.pending_tick = Some(handle);
        } else {
            self.session.pending_tick = None;
            self.display.tally = tally(self.session.repetition_count);
            info!(
                "[TIMER] {:?} finished at repetition {}",
                kind, self.session.repetition_count
            );
            // next interval is never zero-length, so this recurses once
            self.start_timer();
        }
    }

    /// Apply a delivered tick. Returns false for ticks that were cancelled or superseded.
    pub fn on_tick(&mut self, tick: Tick) -> bool {
        if self.session.pending_tick != Some(tick.handle) {
            debug!("[TICK] Ignoring stale tick {:?}", tick.handle);
            return false;
        }
        // reset clears pending_tick, so a matching tick always finds the timer running
        debug_assert!(
            matches!(self.state, TimerState::Running { .. }),
            "pending tick {:?} while idle",
            tick.handle
        );
        let TimerState::Running { kind, .. } = self.state else {
            return false;
        };
        self.session.pending_tick = None;
        debug!("[TICK] {:?} remaining {}s", kind, tick.remaining);
        self.count_down(kind, tick.remaining);
        true
    }

    /// Any state -> Idle. Safe to call when nothing is scheduled.
    pub fn reset_timer(&mut self) {
        if let Some(handle) = self.session.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
        self.session.repetition_count = 0;
        self.state = TimerState::Idle;
        self.display = DisplayModel::idle();
        info!("[TIMER] Reset to idle");
    }

    pub fn get_state(&self) -> TimerStateResponse {
        TimerStateResponse {
            state: self.state.into(),
            repetition_count: self.session.repetition_count,
            label: self.display.label.clone(),
            accent: self.display.accent.color().to_string(),
            timer_text: self.display.timer_text.clone(),
            tally: self.display.tally.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LONG_BREAK_SECONDS, SHORT_BREAK_SECONDS, WORK_SECONDS};

    #[test]
    fn test_odd_repetitions_are_work() {
        for r in (1..200).step_by(2) {
            let interval = select_interval(r);
            assert_eq!(interval.kind, IntervalKind::Work, "repetition {}", r);
            assert_eq!(interval.duration_seconds, WORK_SECONDS);
        }
    }

    #[test]
    fn test_even_repetitions_are_breaks() {
        for r in (0..200).step_by(2) {
            let interval = select_interval(r);
            if r == 8 {
                assert_eq!(interval.kind, IntervalKind::LongBreak);
                assert_eq!(interval.duration_seconds, LONG_BREAK_SECONDS);
            } else {
                assert_eq!(interval.kind, IntervalKind::ShortBreak, "repetition {}", r);
                assert_eq!(interval.duration_seconds, SHORT_BREAK_SECONDS);
            }
        }
    }

    #[test]
    fn test_long_break_does_not_recur() {
        assert_eq!(select_interval(16).kind, IntervalKind::ShortBreak);
        assert_eq!(select_interval(24).kind, IntervalKind::ShortBreak);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(599), "9:59");
        assert_eq!(format_time(1200), "20:00");
        assert_eq!(format_time(1500), "25:00");
    }

    #[test]
    fn test_tally_rounds_up() {
        assert_eq!(tally(0), "");
        assert_eq!(tally(1), "✔");
        assert_eq!(tally(2), "✔");
        assert_eq!(tally(3), "✔✔");
        assert_eq!(tally(8), "✔✔✔✔");
        assert_eq!(tally(9).chars().count(), 5);
    }
}
