//! Producer sessions: one background loop per sensor writing its latest signal.
//!
//! Enabling a session spawns the producer thread and opens the device on that
//! thread (device handles such as audio streams are often not `Send`).
//! `enable` returns as soon as the thread exists; permission and model
//! failures surface on the next [`SensorSession::take_failure`] poll, so the
//! frame loop never waits on a device. Disabling stops the thread, which drops
//! the device, then resets the cell to its neutral value before returning.

use crate::audio::{AudioReducer, AudioSignal};
use crate::constants::{PRODUCER_OPEN_TIMEOUT_SECS, PRODUCER_POLL_MS};
use crate::error::SensorError;
use crate::hand::{HandObservation, HandReducer, HandSignal};
use crate::signal::SignalCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// External hand-pose collaborator: a camera plus landmark inference.
pub trait HandPoseSource: 'static {
    /// Wait up to `timeout` for the next inference result.
    fn next_observation(&mut self, timeout: Duration) -> Result<HandObservation, SensorError>;
}

/// External audio collaborator: a microphone plus frequency analysis.
pub trait SpectrumSource: 'static {
    /// Wait up to `timeout` for a refreshed spectrum; `Ok(true)` when `bins` was overwritten.
    fn next_spectrum(&mut self, bins: &mut Vec<u8>, timeout: Duration)
        -> Result<bool, SensorError>;
}

/// A source paired with its reducer, producing ready-to-publish signals.
///
/// Producers are built and driven on their own thread, so they need not be `Send`.
pub trait Producer: 'static {
    type Signal: Clone + Default + Send + Sync + 'static;

    /// `Ok(None)` when nothing new arrived within `timeout`.
    fn poll(&mut self, timeout: Duration) -> Result<Option<Self::Signal>, SensorError>;
}

pub struct HandProducer<S> {
    source: S,
    reducer: HandReducer,
}

impl<S: HandPoseSource> HandProducer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            reducer: HandReducer::new(),
        }
    }
}

impl<S: HandPoseSource> Producer for HandProducer<S> {
    type Signal = HandSignal;

    fn poll(&mut self, timeout: Duration) -> Result<Option<HandSignal>, SensorError> {
        Ok(match self.source.next_observation(timeout)? {
            HandObservation::Pending => None,
            HandObservation::Absent => Some(self.reducer.observe_absent()),
            HandObservation::Hand(landmarks) => Some(self.reducer.observe(&landmarks)),
        })
    }
}

pub struct AudioProducer<S> {
    source: S,
    reducer: AudioReducer,
    bins: Vec<u8>,
}

impl<S: SpectrumSource> AudioProducer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            reducer: AudioReducer::default(),
            bins: Vec::new(),
        }
    }
}

impl<S: SpectrumSource> Producer for AudioProducer<S> {
    type Signal = AudioSignal;

    fn poll(&mut self, timeout: Duration) -> Result<Option<AudioSignal>, SensorError> {
        if self.source.next_spectrum(&mut self.bins, timeout)? {
            Ok(Some(self.reducer.observe(&self.bins)))
        } else {
            Ok(None)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SensorStatus {
    #[default]
    Off,
    /// The device is being opened on the producer thread.
    Starting,
    Running,
    /// The producer stopped itself; cleared by [`SensorSession::take_failure`].
    Failed(SensorError),
}

/// Publishing side of one producer thread.
///
/// Every write happens under the session gate and only while `stop` is clear,
/// so once a session has stopped a worker nothing it does reaches the cells.
struct Publisher<T> {
    cell: SignalCell<T>,
    status: SignalCell<SensorStatus>,
    gate: Arc<Mutex<()>>,
    stop: Arc<AtomicBool>,
}

impl<T> Publisher<T> {
    fn publish(&self, f: impl FnOnce(&SignalCell<T>, &SignalCell<SensorStatus>)) -> bool {
        let _guard = lock(&self.gate);
        if self.stop.load(Ordering::Acquire) {
            return false;
        }
        f(&self.cell, &self.status);
        true
    }
}

fn lock(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    started: Instant,
}

pub struct SensorSession<T> {
    name: &'static str,
    cell: SignalCell<T>,
    status: SignalCell<SensorStatus>,
    gate: Arc<Mutex<()>>,
    worker: Option<Worker>,
    poll_interval: Duration,
    open_timeout: Duration,
}

impl<T: Clone + Default + Send + Sync + 'static> SensorSession<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: SignalCell::new(T::default()),
            status: SignalCell::new(SensorStatus::Off),
            gate: Arc::new(Mutex::new(())),
            worker: None,
            poll_interval: Duration::from_millis(PRODUCER_POLL_MS),
            open_timeout: Duration::from_secs(PRODUCER_OPEN_TIMEOUT_SECS),
        }
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Handle to the signal slot, for readers living elsewhere.
    pub fn cell(&self) -> SignalCell<T> {
        self.cell.clone()
    }

    pub fn latest(&self) -> T {
        self.cell.get()
    }

    pub fn status(&self) -> SensorStatus {
        self.status.get()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.status() == SensorStatus::Running
    }

    /// Start the producer built by `open` without waiting for the device.
    ///
    /// The session reports `Starting` until `open` returns on the producer
    /// thread. An open error, or an open slower than the open timeout, shows up
    /// later through [`take_failure`](Self::take_failure).
    pub fn enable<P, F>(&mut self, open: F) -> Result<(), SensorError>
    where
        P: Producer<Signal = T>,
        F: FnOnce() -> Result<P, SensorError> + Send + 'static,
    {
        if self.worker.is_some() {
            if !matches!(self.status(), SensorStatus::Failed(_)) {
                return Err(SensorError::AlreadyRunning);
            }
            self.take_failure();
        }

        let stop = Arc::new(AtomicBool::new(false));
        let publisher = Publisher {
            cell: self.cell.clone(),
            status: self.status.clone(),
            gate: Arc::clone(&self.gate),
            stop: Arc::clone(&stop),
        };
        let poll_interval = self.poll_interval;
        let name = self.name;
        self.status.set(SensorStatus::Starting);

        let spawned = thread::Builder::new()
            .name(format!("{name}-producer"))
            .spawn(move || {
                let mut producer = match open() {
                    Ok(p) => p,
                    Err(e) => {
                        log::debug!("[session] {name} failed to start: {e}");
                        publisher.publish(|_, status| status.set(SensorStatus::Failed(e)));
                        return;
                    }
                };
                if !publisher.publish(|_, status| status.set(SensorStatus::Running)) {
                    return;
                }
                log::info!("[session] {name} running");
                loop {
                    let published = match producer.poll(poll_interval) {
                        Ok(Some(signal)) => publisher.publish(|cell, _| cell.set(signal)),
                        Ok(None) => !publisher.stop.load(Ordering::Acquire),
                        Err(e) => {
                            log::debug!("[session] {name} producer stopped: {e}");
                            publisher.publish(|cell, status| {
                                cell.set(T::default());
                                status.set(SensorStatus::Failed(e));
                            });
                            return;
                        }
                    };
                    if !published {
                        break;
                    }
                }
                // producer (and its device) dropped here
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker {
                    stop,
                    handle,
                    started: Instant::now(),
                });
                log::info!("[session] {} starting", self.name);
                Ok(())
            }
            Err(e) => {
                self.reset_neutral();
                Err(SensorError::Unavailable(format!("spawn {name} producer: {e}")))
            }
        }
    }

    /// Stop the producer, then publish the neutral signal.
    ///
    /// A running producer is joined; one still opening its device is left to
    /// exit on its own, since it can no longer publish.
    pub fn disable(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.retire(worker);
            log::info!("[session] {} disabled", self.name);
        }
        self.reset_neutral();
    }

    /// Report a producer failure exactly once, leaving the session off.
    ///
    /// Covers open errors, opens that outlast the open timeout and failures
    /// while running.
    pub fn take_failure(&mut self) -> Option<SensorError> {
        let e = match self.status() {
            SensorStatus::Failed(e) => e,
            SensorStatus::Starting if self.open_expired() => SensorError::Unavailable(format!(
                "{} did not open within {:?}",
                self.name, self.open_timeout
            )),
            _ => return None,
        };
        if let Some(worker) = self.worker.take() {
            self.retire(worker);
        }
        self.reset_neutral();
        log::warn!("[session] {} disabled after failure: {}", self.name, e);
        Some(e)
    }

    fn open_expired(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.started.elapsed() >= self.open_timeout)
    }

    fn reset_neutral(&self) {
        let _guard = lock(&self.gate);
        self.cell.set(T::default());
        self.status.set(SensorStatus::Off);
    }
}

impl<T> SensorSession<T> {
    fn retire(&self, worker: Worker) {
        let opening = {
            let _guard = lock(&self.gate);
            worker.stop.store(true, Ordering::Release);
            self.status.get() == SensorStatus::Starting
        };
        if opening {
            return;
        }
        if worker.handle.join().is_err() {
            log::error!("[session] {} producer panicked", self.name);
        }
    }
}

impl<T> Drop for SensorSession<T> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.retire(worker);
        }
    }
}

pub type HandSession = SensorSession<HandSignal>;
pub type AudioSession = SensorSession<AudioSignal>;
