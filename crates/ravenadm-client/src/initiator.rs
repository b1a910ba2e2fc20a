//! Compaction initiator.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::Instrument;

use ravenadm_core::observability::compaction_span;
use ravenadm_core::{COMPACT_ENDPOINT, CompactStatus, DatabaseName, compact_status_key};

use crate::error::CompactError;
use crate::monitor::{CompactMonitor, CompactionJob, MonitorConfig, PollingMonitor, StatusCallback};
use crate::report::{ErrorReporter, TracingReporter};
use crate::transport::AdminTransport;

/// Starts compactions and hands them off to a [`CompactMonitor`].
///
/// Holds no per-job state, so one initiator can start any number of
/// compactions concurrently.
pub struct CompactionInitiator<M = PollingMonitor> {
    transport: Arc<dyn AdminTransport>,
    reporter: Arc<dyn ErrorReporter>,
    monitor: M,
}

impl CompactionInitiator<PollingMonitor> {
    /// Creates an initiator whose jobs are followed by a [`PollingMonitor`]
    /// sharing the same transport.
    #[must_use]
    pub fn new(transport: Arc<dyn AdminTransport>, config: MonitorConfig) -> Self {
        let monitor = PollingMonitor::new(transport.clone(), config);
        Self::with_monitor(transport, monitor)
    }
}

impl<M: CompactMonitor> CompactionInitiator<M> {
    /// Creates an initiator that hands accepted jobs to `monitor`.
    #[must_use]
    pub fn with_monitor(transport: Arc<dyn AdminTransport>, monitor: M) -> Self {
        Self {
            transport,
            reporter: Arc::new(TracingReporter),
            monitor,
        }
    }

    /// Replaces the default [`TracingReporter`].
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Starts compacting `target`.
    ///
    /// Deletes the stale status document, asks the server to compact, then
    /// starts the monitor with `callback`. Returns once the server has
    /// accepted the request; the returned job settles when the monitor says so.
    ///
    /// `callback` is called here at most once, with a `Faulted` status, when
    /// the server rejects the compaction request. Every other update comes
    /// from the monitor.
    ///
    /// # Errors
    ///
    /// - [`CompactError::StatusDocumentDelete`] if the status document could
    ///   not be deleted. The compaction request is not sent.
    /// - [`CompactError::CompactRequest`] if the compaction request failed.
    pub async fn start(
        &self,
        target: DatabaseName,
        callback: StatusCallback,
    ) -> Result<CompactionJob, CompactError> {
        let span = compaction_span("start", target.as_str());
        self.start_inner(target, callback).instrument(span).await
    }

    async fn start_inner(
        &self,
        target: DatabaseName,
        callback: StatusCallback,
    ) -> Result<CompactionJob, CompactError> {
        let status_key = compact_status_key(&target);
        if let Err(source) = self.transport.delete_document(&status_key).await {
            self.reporter.report_error(
                "Failed to delete compact status document!",
                source.response_text(),
                Some(&source.status_text()),
            );
            return Err(CompactError::StatusDocumentDelete {
                database: target,
                source,
            });
        }
        tracing::debug!(key = %status_key, "stale compact status deleted");

        if let Err(source) = self
            .transport
            .post(COMPACT_ENDPOINT, &[("database", target.as_str())])
            .await
        {
            self.reporter.report_error(
                "Failed to compact database!",
                source.response_text(),
                Some(&source.status_text()),
            );
            let message = source.server_message();
            callback(CompactStatus::faulted(message.clone()));
            return Err(CompactError::CompactRequest {
                database: target,
                message,
                source,
            });
        }
        tracing::info!("compaction accepted");

        let (completion, outcome) = oneshot::channel();
        self.monitor.start(completion, target.clone(), callback);
        Ok(CompactionJob::new(target, outcome))
    }
}
