//! Worker pool, port feeder and result collector.
//!
//! The feeder pushes ports into a bounded channel shared by every worker.
//! Each worker probes one port at a time, so the number of workers is the
//! number of connections in flight. Outcomes flow through a second bounded
//! channel to a single collector task that alone owns the result vector.

use crate::scanner::tcp::ConnectProbe;
use crate::scanner::traits::{Connector, ProbeOutcome};
use crate::types::{Port, PortRange};
use indicatif::ProgressBar;
use std::panic;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Capacity of both the port and the outcome channel.
pub const QUEUE_CAPACITY: usize = 1000;

/// Receiving end of the port channel, shared by all workers.
pub type PortQueue = Arc<Mutex<mpsc::Receiver<Port>>>;

/// Start feeding `range` into a fresh port queue.
///
/// The channel closes once every port is queued, or early on cancellation.
pub fn spawn_feeder(range: PortRange, cancel: CancellationToken) -> (PortQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

    let handle = tokio::spawn(async move {
        for port in range.iter() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = tx.send(port) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        trace!("port feeder exhausted");
    });

    (Arc::new(Mutex::new(rx)), handle)
}

/// Drains outcomes into memory on its own task.
pub struct ResultCollector {
    handle: JoinHandle<Vec<ProbeOutcome>>,
}

impl ResultCollector {
    /// Spawn the collector and return the sender workers push into.
    pub fn spawn(expected: usize) -> (mpsc::Sender<ProbeOutcome>, Self) {
        let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);

        let handle = tokio::spawn(async move {
            let mut outcomes = Vec::with_capacity(expected);
            while let Some(outcome) = rx.recv().await {
                outcomes.push(outcome);
            }
            outcomes
        });

        (tx, Self { handle })
    }

    /// Wait for every sender to drop and hand back the collected outcomes.
    pub async fn finish(self) -> Vec<ProbeOutcome> {
        match self.handle.await {
            Ok(outcomes) => outcomes,
            Err(e) => propagate(e),
        }
    }
}

/// A fixed set of workers pulling from one port queue.
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawn `size` workers.
    ///
    /// `outcomes` is moved in; once all workers exit the channel closes and
    /// the collector can finish.
    pub fn spawn<C>(
        size: usize,
        probe: Arc<ConnectProbe<C>>,
        ports: PortQueue,
        outcomes: mpsc::Sender<ProbeOutcome>,
        cancel: CancellationToken,
        progress: Option<ProgressBar>,
    ) -> Self
    where
        C: Connector + 'static,
    {
        let mut workers = JoinSet::new();

        for id in 0..size.max(1) {
            workers.spawn(run_worker(
                id,
                Arc::clone(&probe),
                Arc::clone(&ports),
                outcomes.clone(),
                cancel.clone(),
                progress.clone(),
            ));
        }

        Self { workers }
    }

    /// Wait until every worker has exited.
    pub async fn join(mut self) {
        while let Some(res) = self.workers.join_next().await {
            if let Err(e) = res {
                propagate(e);
            }
        }
    }
}

async fn run_worker<C: Connector>(
    id: usize,
    probe: Arc<ConnectProbe<C>>,
    ports: PortQueue,
    outcomes: mpsc::Sender<ProbeOutcome>,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
) {
    let mut probed = 0usize;

    loop {
        let next = {
            let mut rx = ports.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                port = rx.recv() => port,
            }
        };
        let Some(port) = next else { break };

        // Dropping the probe future closes any half-open dial.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = probe.probe(port) => outcome,
        };
        probed += 1;

        if let Some(pb) = &progress {
            pb.inc(1);
            if outcome.is_open() {
                pb.set_message(format!("Found open port: {}", port));
            }
        }

        if outcomes.send(outcome).await.is_err() {
            break;
        }
    }

    debug!(worker = id, probed, "worker finished");
}

/// Our tasks are never aborted, so a join error is a panic to re-raise.
fn propagate(e: JoinError) -> ! {
    match e.try_into_panic() {
        Ok(payload) => panic::resume_unwind(payload),
        Err(e) => panic!("scan task cancelled unexpectedly: {}", e),
    }
}
