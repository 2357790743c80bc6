//! Janitor Task
//!
//! Background sweeper that periodically removes expired cache entries.

use std::io;
use std::sync::{mpsc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Longest supported sweep interval.
const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// == Sweeper ==
/// Something the janitor can sweep.
pub trait Sweeper: Send + Sync + 'static {
    /// Removes expired entries and returns how many were removed.
    fn sweep(&self) -> usize;
}

// == Janitor ==
/// Owned background task that sweeps its target on a fixed interval.
///
/// The task runs on its own thread with a single-threaded tokio runtime, so
/// it works whether or not the caller is inside an async runtime. It holds
/// only a `Weak` reference to the target and exits once the target is gone.
///
/// Dropping the janitor stops it.
#[derive(Debug)]
pub struct Janitor {
    interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Starts sweeping `target` every `interval`.
    ///
    /// The first sweep happens one interval after start. Intervals above
    /// one year are clamped to one year.
    ///
    /// # Errors
    /// Returns the I/O error if the runtime or thread could not be created.
    pub fn start<S: Sweeper>(target: Weak<S>, interval: Duration) -> io::Result<Self> {
        let interval = if interval > MAX_INTERVAL {
            warn!(
                "Janitor interval {:?} too large, clamping to {:?}",
                interval, MAX_INTERVAL
            );
            MAX_INTERVAL
        } else {
            interval
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = thread::Builder::new()
            .name("ttl-cache-janitor".to_string())
            .spawn(move || {
                // Built here so it is never dropped on the caller's thread
                let runtime = match Builder::new_current_thread().enable_time().build() {
                    Ok(runtime) => {
                        let _ = ready_tx.send(Ok(()));
                        runtime
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                run(runtime, target, interval, stop_rx);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = handle.join();
                return Err(err);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(io::Error::other("janitor thread exited before starting"));
            }
        }

        info!("Starting janitor with interval of {:?}", interval);

        Ok(Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Interval between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the sweep loop is still alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Stop ==
    /// Signals the loop to exit and waits for it.
    ///
    /// The loop wakes immediately rather than at the next tick. Calling this
    /// again after the first time does nothing.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Receiver is gone if the loop already exited
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            // A callback running on the janitor thread may drop the last owner
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Janitor thread panicked");
            }
            info!("Janitor stopped");
        }
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sweep loop, runs until stopped or until the target is dropped.
fn run<S: Sweeper>(
    runtime: Runtime,
    target: Weak<S>,
    interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    runtime.block_on(async move {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("Janitor target dropped, exiting");
                        break;
                    };

                    let removed = target.sweep();
                    if removed > 0 {
                        info!("Janitor: removed {} expired entries", removed);
                    } else {
                        debug!("Janitor: no expired entries found");
                    }
                }
                _ = &mut stop_rx => break,
            }
        }
    });
}
