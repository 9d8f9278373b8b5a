use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::{Cadence, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::estimator::{OrientationEstimator, YawOrigin};
use crate::host::{OrientationHost, PermissionState};
use crate::types::{OrientationEstimate, RawSample};

/// One sensor subscription: permission gate, estimator task and the
/// published estimate.
///
/// Readers get the latest estimate through `snapshot()` or a `watch`
/// receiver; intermediate estimates may be skipped.
pub struct OrientationSession<H: OrientationHost> {
    host: Arc<H>,
    config: TrackerConfig,
    estimator: Arc<Mutex<OrientationEstimator>>,
    estimate_tx: Arc<watch::Sender<OrientationEstimate>>,
    estimate_rx: watch::Receiver<OrientationEstimate>,
    permission_granted: bool,
    task: Option<JoinHandle<()>>,
}

impl<H: OrientationHost> OrientationSession<H> {
    pub fn new(host: Arc<H>, config: TrackerConfig) -> Self {
        let estimator = OrientationEstimator::new(config.fusion, config.convention);
        let (estimate_tx, estimate_rx) = watch::channel(OrientationEstimate::default());
        Self {
            host,
            config,
            estimator: Arc::new(Mutex::new(estimator)),
            estimate_tx: Arc::new(estimate_tx),
            estimate_rx,
            permission_granted: false,
            task: None,
        }
    }

    /// Ask the host for sensor access.
    ///
    /// Hosts without a gate are granted immediately. Denials and failures
    /// leave the flag false; nothing is retried.
    pub async fn request_permission(&mut self) -> Result<()> {
        if !self.host.requires_permission() {
            self.permission_granted = true;
            return Ok(());
        }

        match self.host.request_sensor_permission().await {
            Ok(PermissionState::Granted) => {
                self.permission_granted = true;
                log::info!("Sensor permission granted");
                Ok(())
            }
            Ok(PermissionState::Denied) => {
                self.permission_granted = false;
                log::warn!("Sensor permission denied; orientation will not update");
                Err(TrackerError::PermissionDenied)
            }
            Err(e) => {
                self.permission_granted = false;
                log::error!("Sensor permission request failed: {e}");
                Err(e)
            }
        }
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted || !self.host.requires_permission()
    }

    /// Start consuming `source`. Must be called inside a tokio runtime.
    ///
    /// An existing subscription is replaced.
    pub fn subscribe(&mut self, source: mpsc::Receiver<RawSample>) -> Result<()> {
        if !self.permission_granted() {
            return Err(TrackerError::PermissionNotGranted);
        }
        self.config.validate()?;
        if self.task.is_some() {
            log::info!("Replacing existing orientation subscription");
            self.unsubscribe();
        }

        let worker = Worker {
            host: Arc::clone(&self.host),
            estimator: Arc::clone(&self.estimator),
            estimate_tx: Arc::clone(&self.estimate_tx),
            progress_log_interval: self.config.progress_log_interval,
        };
        let cadence = self.config.cadence();
        self.task = Some(tokio::spawn(worker.run(source, cadence)));
        log::info!("Orientation subscription started ({cadence:?})");
        Ok(())
    }

    /// Request permission if needed, then subscribe.
    pub async fn start(&mut self, source: mpsc::Receiver<RawSample>) -> Result<()> {
        if !self.permission_granted() {
            self.request_permission().await?;
        }
        self.subscribe(source)
    }

    /// Stop consuming. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::info!("Orientation subscription stopped");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Clear the yaw origin; the next processed sample becomes zero.
    pub fn reset_yaw(&self) -> Result<()> {
        let mut estimator = self.lock_estimator()?;
        estimator.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> OrientationEstimate {
        *self.estimate_rx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<OrientationEstimate> {
        self.estimate_rx.clone()
    }

    pub fn yaw_origin(&self) -> Result<YawOrigin> {
        Ok(self.lock_estimator()?.origin())
    }

    /// (processed, dropped) sample counts.
    pub fn sample_counts(&self) -> Result<(u64, u64)> {
        let estimator = self.lock_estimator()?;
        Ok((estimator.samples_processed(), estimator.samples_dropped()))
    }

    fn lock_estimator(&self) -> Result<std::sync::MutexGuard<'_, OrientationEstimator>> {
        self.estimator
            .lock()
            .map_err(|_| TrackerError::Internal("Failed to acquire estimator lock".to_string()))
    }
}

impl<H: OrientationHost> Drop for OrientationSession<H> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// State moved into the background task.
struct Worker<H: OrientationHost> {
    host: Arc<H>,
    estimator: Arc<Mutex<OrientationEstimator>>,
    estimate_tx: Arc<watch::Sender<OrientationEstimate>>,
    progress_log_interval: u64,
}

impl<H: OrientationHost> Worker<H> {
    async fn run(self, mut source: mpsc::Receiver<RawSample>, cadence: Cadence) {
        match cadence {
            Cadence::PerEvent => {
                while let Some(sample) = source.recv().await {
                    if !self.process(&sample) {
                        return;
                    }
                }
            }
            Cadence::Fixed(period) => {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // Newest sample wins; older unconsumed samples are discarded.
                let mut pending: Option<RawSample> = None;

                loop {
                    tokio::select! {
                        biased;
                        _ = ticker.tick() => {
                            if let Some(sample) = pending.take() {
                                if !self.process(&sample) {
                                    return;
                                }
                            }
                        }
                        received = source.recv() => match received {
                            Some(sample) => pending = Some(sample),
                            None => break,
                        },
                    }
                }

                if let Some(sample) = pending.take() {
                    self.process(&sample);
                }
            }
        }
        log::info!("Orientation source closed");
    }

    /// Returns false if the task should stop.
    fn process(&self, sample: &RawSample) -> bool {
        let screen = self.host.current_screen_rotation();
        let mut estimator = match self.estimator.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::error!("Estimator lock poisoned; stopping orientation task");
                return false;
            }
        };

        if let Some(estimate) = estimator.update(sample, screen) {
            self.estimate_tx.send_replace(estimate);
            let processed = estimator.samples_processed();
            if self.progress_log_interval > 0 && processed % self.progress_log_interval == 0 {
                log::debug!(
                    "{processed} orientation samples processed ({} dropped)",
                    estimator.samples_dropped()
                );
            }
        }
        true
    }
}
