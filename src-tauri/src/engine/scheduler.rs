use crate::engine::{SharedEngine, TimerStateResponse};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// A countdown step due for delivery: show `remaining` seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub handle: TickHandle,
    pub remaining: u64,
}

/// One-shot delayed ticks. The only two operations the countdown needs from the host.
pub trait TickScheduler: Send {
    fn schedule(&mut self, delay: Duration, remaining: u64) -> TickHandle;

    /// No-op for unknown, fired or already cancelled handles
    fn cancel(&mut self, handle: TickHandle);
}

/// Runs each tick as a tokio task that sleeps and then sends the `Tick` on a channel
pub struct TokioScheduler {
    runtime: Handle,
    sender: UnboundedSender<Tick>,
    next_id: u64,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle, sender: UnboundedSender<Tick>) -> Self {
        Self {
            runtime,
            sender,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Ticks whose task has not finished yet
    pub fn pending_count(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, remaining: u64) -> TickHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        let tick = Tick { handle, remaining };
        let sender = self.sender.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(tick).is_err() {
                debug!("[TICK] Receiver closed, dropping tick {:?}", tick.handle);
            }
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

/// Deliver ticks to the engine until every sender is gone.
/// `on_update` gets the snapshot after each applied tick and runs with the engine
/// still locked, so no Start/Reset can land between the snapshot and its emit.
pub async fn run_tick_loop<S, F>(
    shared: SharedEngine<S>,
    mut receiver: UnboundedReceiver<Tick>,
    mut on_update: F,
) where
    S: TickScheduler,
    F: FnMut(&TimerStateResponse),
{
    info!("[TICK] Tick loop started");
    while let Some(tick) = receiver.recv().await {
        let mut engine = match shared.lock() {
            Ok(engine) => engine,
            Err(e) => {
                error!("[TICK] Mutex poisoned: {}", e);
                break;
            }
        };
        if engine.on_tick(tick) {
            on_update(&engine.get_state());
        }
    }
    info!("[TICK] Tick loop stopped");
}
