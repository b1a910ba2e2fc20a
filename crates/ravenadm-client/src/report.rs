//! Error reporting for failures the user should see.

/// Surfaces failed admin requests to whoever is driving the operation.
pub trait ErrorReporter: Send + Sync {
    /// Reports a failure.
    ///
    /// `details` is the raw response text, if any; `status_text` is the HTTP
    /// status line or the transport failure description.
    fn report_error(&self, title: &str, details: Option<&str>, status_text: Option<&str>);
}

/// [`ErrorReporter`] that emits `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report_error(&self, title: &str, details: Option<&str>, status_text: Option<&str>) {
        tracing::error!(
            details = details.unwrap_or_default(),
            status = status_text.unwrap_or_default(),
            "{title}"
        );
    }
}
