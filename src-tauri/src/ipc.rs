//! Centralized IPC event and command names.
//! Prevents typos between the Rust side and ui/main.js.

/// Tauri event names (Rust emit ↔ Frontend listen)
pub mod events {
    /// Payload: `TimerStateResponse`
    pub const TIMER_STATE_UPDATE: &str = "timer-state-update";
}

/// Tauri command names (Frontend invoke → Rust handler).
/// Must match the fn names in `register_commands`; the command tests invoke through these.
#[cfg_attr(not(test), allow(dead_code))]
pub mod commands {
    pub const START_TIMER: &str = "start_timer";
    pub const RESET_TIMER: &str = "reset_timer";
    pub const GET_TIMER_STATE: &str = "get_timer_state";
}
