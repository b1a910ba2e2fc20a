//! In-memory transport and status recorders for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use ravenadm_core::CompactStatus;

use crate::error::TransportError;
use crate::monitor::StatusCallback;
use crate::transport::{AdminTransport, Document};

/// A call observed by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Delete {
        key: String,
    },
    Get {
        key: String,
    },
    Post {
        path: String,
        query: Vec<(String, String)>,
    },
}

type DocumentResult = Result<Option<Value>, TransportError>;

/// Transport that records every call and answers from a script.
///
/// Deletes and posts succeed unless a failure was queued with
/// [`fail_next_delete`](Self::fail_next_delete) or
/// [`fail_next_post`](Self::fail_next_post). Gets pop the next scripted
/// result for the key, and report a missing document once the script runs out.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    delete_failures: Mutex<VecDeque<TransportError>>,
    post_failures: Mutex<VecDeque<TransportError>>,
    documents: Mutex<HashMap<String, VecDeque<DocumentResult>>>,
}

impl ScriptedTransport {
    pub(crate) fn fail_next_delete(&self, err: TransportError) {
        self.delete_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn fail_next_post(&self, err: TransportError) {
        self.post_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn push_document(&self, key: &str, result: DocumentResult) {
        self.documents
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AdminTransport for ScriptedTransport {
    async fn delete_document(&self, key: &str) -> Result<(), TransportError> {
        self.record(Call::Delete {
            key: key.to_string(),
        });
        match self.delete_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn get_document(&self, key: &str) -> Result<Option<Document>, TransportError> {
        self.record(Call::Get {
            key: key.to_string(),
        });
        self.documents
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None))
            .map(|body| body.map(Document::new))
    }

    async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<(), TransportError> {
        self.record(Call::Post {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        });
        match self.post_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Collects every status delivered to its callback.
#[derive(Clone, Default)]
pub(crate) struct StatusLog(Arc<Mutex<Vec<CompactStatus>>>);

impl StatusLog {
    pub(crate) fn callback(&self) -> StatusCallback {
        let log = self.0.clone();
        Arc::new(move |status| log.lock().unwrap().push(status))
    }

    pub(crate) fn statuses(&self) -> Vec<CompactStatus> {
        self.0.lock().unwrap().clone()
    }
}
