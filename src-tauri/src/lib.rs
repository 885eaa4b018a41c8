use std::sync::{Arc, Mutex};
use tauri::{Builder, Emitter, Manager, RunEvent, Runtime};
use tracing::{error, info, warn};
mod commands;
mod engine;
mod ipc;
use commands::*;
pub use engine::{
    format_time, run_tick_loop, select_interval, tally, Accent, DisplayModel, Interval,
    IntervalKind, PomodoroEngine, SessionState, SharedEngine, Tick, TickHandle, TickScheduler,
    TimerState, TimerStateForAPI, TimerStateResponse, TokioScheduler, CHECKMARK, IDLE_LABEL,
    IDLE_TIMER_TEXT, LONG_BREAK_REPETITION, LONG_BREAK_SECONDS, SHORT_BREAK_SECONDS,
    TICK_DELAY, WORK_SECONDS,
};

/// Engine as managed by Tauri
pub(crate) type AppEngine = SharedEngine<TokioScheduler>;


/// Runtime that delivers ticks, separate from the webview event loop
fn tick_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| std::io::Error::other(format!("Failed to create tick runtime: {}", e)))
}

/// Commands reachable from the window; names match `ipc::commands`
fn register_commands<R: Runtime>(builder: Builder<R>) -> Builder<R> {
    builder.invoke_handler(tauri::generate_handler![
        start_timer,
        reset_timer,
        get_timer_state
    ])
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // info by default when RUST_LOG is not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    #[cfg(desktop)]
    let builder = Builder::default().plugin(tauri_plugin_single_instance::init(
        |app, _args, _cwd| {
            // One timer per user: focus the running window instead of opening another
            if let Some(win) = app.get_webview_window("main") {
                let _ = win.show();
                let _ = win.set_focus();
            }
        },
    ));
    #[cfg(not(desktop))]
    let builder = Builder::default();

    register_commands(builder)
        .setup(|app| {
            // Ticks run on a dedicated runtime so the webview thread never blocks on them
            let runtime = tick_runtime()?;
            let (tick_tx, tick_rx) = tokio::sync::mpsc::unbounded_channel();
            let scheduler = TokioScheduler::new(runtime.handle().clone(), tick_tx);
            let engine: AppEngine = Arc::new(Mutex::new(PomodoroEngine::new(scheduler)));

            let engine_for_ticks = engine.clone();
            let app_handle = app.handle().clone();
            std::thread::Builder::new()
                .name("pomodoro-ticks".into())
                .spawn(move || {
                    runtime.block_on(run_tick_loop(engine_for_ticks, tick_rx, |state| {
                        if let Err(e) =
                            app_handle.emit(crate::ipc::events::TIMER_STATE_UPDATE, state)
                        {
                            warn!("[TICK] Failed to emit timer state: {}", e);
                        }
                    }));
                })?;

            app.manage(engine);
            info!("[SETUP] Pomodoro engine ready");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            // Leave nothing scheduled behind on exit
            if let RunEvent::ExitRequested { .. } = event {
                if let Some(engine) = app_handle.try_state::<AppEngine>() {
                    match engine.lock() {
                        Ok(mut engine) => {
                            engine.reset_timer();
                            info!("[SHUTDOWN] Timer cancelled on exit");
                        }
                        Err(e) => error!("[SHUTDOWN] Mutex poisoned: {}", e),
                    }
                }
            }
        });
}
