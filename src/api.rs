//! Remote patient collection: fetching, decoding and background delivery.

use crate::models::{ApiUser, PatientRecord};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Every way the patient fetch can fail. The display text is what the
/// directory shows in its error banner.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch: {0}")]
    Status(u16),
    #[error("Error fetching patients: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error fetching patients: malformed response ({0})")]
    Malformed(#[from] serde_json::Error),
    /// The worker went away without reporting a result.
    #[error("Error fetching patients")]
    Interrupted,
}

pub type FetchResult = Result<Vec<PatientRecord>, FetchError>;

/// Anything that can produce the patient collection.
pub trait PatientSource: Send + Sync {
    fn fetch(&self) -> FetchResult;
}

/// Reads the collection with a single GET against a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpPatientSource {
    url: String,
    timeout: Option<Duration>,
}

impl HttpPatientSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl PatientSource for HttpPatientSource {
    fn fetch(&self) -> FetchResult {
        // reqwest applies a 30s timeout unless told otherwise.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        info!(url = %self.url, "fetching patients");
        let response = client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes()?;
        let users: Vec<ApiUser> = serde_json::from_slice(&body)?;
        let records: Vec<PatientRecord> = users.into_iter().map(PatientRecord::from).collect();
        Ok(records)
    }
}

/// A fetch running on a worker thread.
///
/// Dropping this discards the result: the worker's send fails and nothing
/// reaches the view that started it.
pub struct PendingFetch {
    rx: Receiver<FetchResult>,
}

impl PendingFetch {
    /// Returns the result once it has arrived, without blocking.
    pub fn poll(&self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FetchError::Interrupted)),
        }
    }
}

/// Runs `source` once on a background thread.
pub fn spawn_fetch(source: Arc<dyn PatientSource>) -> PendingFetch {
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("patient-fetch".into())
        .spawn(move || {
            if tx.send(source.fetch()).is_err() {
                debug!("patients view closed before the fetch finished; result discarded");
            }
        });

    if let Err(e) = spawned {
        // The sender died with the closure, so `poll` reports Interrupted.
        warn!(error = %e, "could not start patient fetch worker");
    }

    PendingFetch { rx }
}
