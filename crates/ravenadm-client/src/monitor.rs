//! Compaction status monitoring.
//!
//! Once the server accepts a compaction request, a [`CompactMonitor`] owns all
//! further reporting: it forwards every status update to the caller's
//! callback and is the only writer of the job's [`Completion`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::Instrument;

use ravenadm_core::observability::compaction_span;
use ravenadm_core::{CompactState, CompactStatus, DatabaseName, compact_status_key};

use crate::error::{BoxError, CompactError};
use crate::transport::AdminTransport;

/// Caller-supplied receiver of compaction status updates.
pub type StatusCallback = Arc<dyn Fn(CompactStatus) + Send + Sync>;

/// Single-writer handle that settles a [`CompactionJob`].
pub type Completion = oneshot::Sender<Result<(), CompactError>>;

/// Follows a compaction after the server has accepted it.
pub trait CompactMonitor: Send + Sync {
    /// Starts monitoring `target`.
    ///
    /// Implementations must report updates through `callback` and settle
    /// `completion` once the job reaches a terminal state.
    fn start(&self, completion: Completion, target: DatabaseName, callback: StatusCallback);
}

/// An accepted compaction whose outcome is settled by its monitor.
#[derive(Debug)]
pub struct CompactionJob {
    database: DatabaseName,
    outcome: oneshot::Receiver<Result<(), CompactError>>,
}

impl CompactionJob {
    pub(crate) fn new(
        database: DatabaseName,
        outcome: oneshot::Receiver<Result<(), CompactError>>,
    ) -> Self {
        Self { database, outcome }
    }

    /// Returns the database being compacted.
    #[must_use]
    pub fn database(&self) -> &DatabaseName {
        &self.database
    }

    /// Waits for the monitor to settle the job.
    ///
    /// Dropping the job instead stops the monitor at its next poll.
    ///
    /// # Errors
    ///
    /// Returns the monitor's failure, or [`CompactError::MonitorAbandoned`]
    /// if the monitor went away without settling.
    pub async fn wait(self) -> Result<(), CompactError> {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => Err(CompactError::MonitorAbandoned {
                database: self.database,
            }),
        }
    }
}

/// Polling configuration for [`PollingMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay between status document fetches.
    pub poll_interval: Duration,
    /// Consecutive failed fetches tolerated before giving up (minimum 1).
    pub max_consecutive_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_consecutive_failures: 5,
        }
    }
}

/// [`CompactMonitor`] that polls the status document in the system database.
#[derive(Clone)]
pub struct PollingMonitor {
    transport: Arc<dyn AdminTransport>,
    config: MonitorConfig,
}

impl PollingMonitor {
    /// Creates a monitor that polls through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn AdminTransport>, config: MonitorConfig) -> Self {
        Self { transport, config }
    }

    async fn poll_once(&self, key: &str) -> Result<Option<CompactStatus>, BoxError> {
        let Some(document) = self.transport.get_document(key).await? else {
            return Ok(None);
        };
        Ok(Some(CompactStatus::from_document(document.body)?))
    }

    async fn watch(self, mut completion: Completion, target: DatabaseName, callback: StatusCallback) {
        let key = compact_status_key(&target);
        let max_failures = self.config.max_consecutive_failures.max(1);
        let mut failures = 0_u32;

        let outcome = loop {
            match self.poll_once(&key).await {
                Ok(Some(status)) => {
                    failures = 0;
                    let settled = status.state.is_terminal().then(|| {
                        if status.state == CompactState::Completed {
                            Ok(())
                        } else {
                            Err(CompactError::Faulted {
                                database: target.clone(),
                                messages: status.messages.clone(),
                            })
                        }
                    });
                    tracing::debug!(state = %status.state, "compact status update");
                    callback(status);
                    if let Some(outcome) = settled {
                        break outcome;
                    }
                }
                Ok(None) => {
                    failures = 0;
                    tracing::debug!("compact status document not written yet");
                }
                Err(source) => {
                    failures += 1;
                    tracing::warn!(
                        error = %source,
                        attempt = failures,
                        max_attempts = max_failures,
                        "failed to read compact status"
                    );
                    if failures >= max_failures {
                        break Err(CompactError::Monitor {
                            database: target.clone(),
                            attempts: failures,
                            source,
                        });
                    }
                }
            }

            tokio::select! {
                () = completion.closed() => {
                    tracing::debug!("compaction job dropped; monitor stopping");
                    return;
                }
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        };

        match &outcome {
            Ok(()) => tracing::info!("compaction completed"),
            Err(err) => tracing::warn!(error = %err, "compaction did not complete"),
        }
        // The receiver may already be gone; nobody is left to tell.
        let _ = completion.send(outcome);
    }
}

impl CompactMonitor for PollingMonitor {
    fn start(&self, completion: Completion, target: DatabaseName, callback: StatusCallback) {
        let span = compaction_span("monitor", target.as_str());
        let monitor = self.clone();
        tokio::spawn(
            monitor
                .watch(completion, target, callback)
                .instrument(span),
        );
    }
}
