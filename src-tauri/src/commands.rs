use crate::engine::{PomodoroEngine, TimerStateResponse, TokioScheduler};
use crate::AppEngine;
use std::sync::MutexGuard;
use tauri::{AppHandle, Emitter, Runtime, State};
use tracing::warn;

fn lock_engine<'a>(
    engine: &'a State<'_, AppEngine>,
) -> Result<MutexGuard<'a, PomodoroEngine<TokioScheduler>>, String> {
    engine.lock().map_err(|e| format!("Mutex poisoned: {}", e))
}

/// Push the snapshot to every window, not only the caller.
/// Called with the engine locked so events leave in the order the state changed.
fn broadcast<R: Runtime>(app: &AppHandle<R>, state: &TimerStateResponse) {
    if let Err(e) = app.emit(crate::ipc::events::TIMER_STATE_UPDATE, state) {
        warn!("[IPC] Failed to emit timer state: {}", e);
    }
}

// ============================================
// TAURI COMMANDS for the Pomodoro engine
// ============================================

#[tauri::command]
pub async fn start_timer<R: Runtime>(
    engine: State<'_, AppEngine>,
    app: AppHandle<R>,
) -> Result<TimerStateResponse, String> {
    let mut engine = lock_engine(&engine)?;
    engine.start_timer();
    let state = engine.get_state();
    broadcast(&app, &state);
    Ok(state)
}

#[tauri::command]
pub async fn reset_timer<R: Runtime>(
    engine: State<'_, AppEngine>,
    app: AppHandle<R>,
) -> Result<TimerStateResponse, String> {
    let mut engine = lock_engine(&engine)?;
    engine.reset_timer();
    let state = engine.get_state();
    broadcast(&app, &state);
    Ok(state)
}

#[tauri::command]
pub async fn get_timer_state(engine: State<'_, AppEngine>) -> Result<TimerStateResponse, String> {
    Ok(lock_engine(&engine)?.get_state())
}
