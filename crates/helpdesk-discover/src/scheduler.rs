//! Periodic discovery.
//!
//! A single background task waits on a [`Ticker`] and starts a full
//! discovery pass on every tick. Each pass runs on its own task, so a slow
//! sweep does not delay the next trigger; the loop keeps the passes in a
//! [`JoinSet`] and drains it before exiting.

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

use crate::orchestrator::{DiscoveryService, DiscoveryStatus, ScanReport};

/// Source of scan triggers.
#[async_trait]
pub trait Ticker: Send + 'static {
    /// Wait for the next trigger. Returns `false` once no more will come.
    async fn tick(&mut self) -> bool;
}

/// Fires immediately, then once per period.
pub struct IntervalTicker(Interval);

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut inner = interval(period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self(inner)
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.0.tick().await;
        true
    }
}

pub struct ScanScheduler<T: Ticker = IntervalTicker> {
    service: DiscoveryService,
    ticker: Option<T>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ScanScheduler<IntervalTicker> {
    /// Scheduler ticking at the configured scan interval.
    pub fn with_interval(service: DiscoveryService) -> Self {
        let ticker = IntervalTicker::new(service.config().scan_interval());
        Self::new(service, ticker)
    }
}

impl<T: Ticker> ScanScheduler<T> {
    pub fn new(service: DiscoveryService, ticker: T) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            service,
            ticker: Some(ticker),
            shutdown,
            task: None,
        }
    }

    pub fn status(&self) -> DiscoveryStatus {
        self.service.status()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Spawn the trigger loop. Does nothing when discovery is disabled or
    /// the scheduler was already started.
    pub fn start(&mut self) {
        if !self.service.config().enabled {
            tracing::info!("Network discovery disabled, scheduler not started");
            return;
        }
        let Some(mut ticker) = self.ticker.take() else {
            tracing::warn!("Scheduler already started");
            return;
        };

        let service = self.service.clone();
        let mut shutdown = self.shutdown.subscribe();
        let subnets = service.config().subnets();
        tracing::info!(
            subnets = ?subnets,
            interval_ms = service.config().scan_interval,
            "Scan scheduler started"
        );

        self.task = Some(tokio::spawn(async move {
            let mut scans = JoinSet::new();
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    Some(finished) = scans.join_next(), if !scans.is_empty() => {
                        reap(finished);
                    }
                    more = ticker.tick() => {
                        if !more {
                            break;
                        }
                        tracing::info!(in_flight = scans.len(), "Scheduled network discovery triggered");
                        let svc = service.clone();
                        scans.spawn(async move { svc.run_scan().await });
                    }
                }
            }
            if !scans.is_empty() {
                tracing::info!(in_flight = scans.len(), "Waiting for running scans");
            }
            while let Some(finished) = scans.join_next().await {
                reap(finished);
            }
            tracing::info!("Scan scheduler stopped");
        }));
    }

    /// Signal the loop to exit and wait for it. Returns once every scan
    /// already in flight has finished.
    pub async fn stop(&mut self) {
        // Only fails when no loop is subscribed.
        let _ = self.shutdown.send(true);
        self.join().await;
    }

    /// Wait for the loop to end on its own (ticker exhausted), including the
    /// scans it started.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Scheduler task panicked");
            }
        }
    }
}

/// The report itself is logged by the scan; only a panic needs reporting.
fn reap(finished: std::result::Result<ScanReport, JoinError>) {
    if let Err(e) = finished {
        tracing::error!(error = %e, "Scheduled scan panicked");
    }
}
