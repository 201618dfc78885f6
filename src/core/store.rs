use crate::error::FetchResult;
use crate::fetcher::IndicatorSource;
use crate::models::SeriesBundle;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trim and uppercase a user-entered series code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Result of one spawned fetch, delivered back to the store owner.
#[derive(Debug)]
pub struct FetchCompletion {
    pub code: String,
    ticket: u64,
    pub result: FetchResult<SeriesBundle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A fetch was issued.
    Requested,
    EmptyCode,
    AlreadyResolved,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Resolved { code: String },
    Failed { code: String, message: String },
    /// The code was removed (or re-requested) before its response arrived.
    Discarded { code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesStatus {
    Pending,
    Ready,
    Failed,
}

/// Active series codes plus the bundles fetched for them.
///
/// Fetches run as spawned tasks; their results come back over a channel and are
/// applied only by the owner through [`SeriesStore::next_event`] or
/// [`SeriesStore::poll_event`], so every mapping update is a single replace.
pub struct SeriesStore {
    source: Arc<dyn IndicatorSource>,
    active: Vec<String>,
    bundles: HashMap<String, SeriesBundle>,
    in_flight: HashMap<String, u64>,
    failed: HashSet<String>,
    last_error: Option<String>,
    next_ticket: u64,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    rx: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl SeriesStore {
    pub fn new(source: Arc<dyn IndicatorSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            active: Vec::new(),
            bundles: HashMap::new(),
            in_flight: HashMap::new(),
            failed: HashSet::new(),
            last_error: None,
            next_ticket: 0,
            tx,
            rx,
        }
    }

    /// Start fetching `code` unless it is empty, resolved, or already in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn add(&mut self, code: &str) -> AddOutcome {
        let code = normalize_code(code);
        if code.is_empty() {
            return AddOutcome::EmptyCode;
        }
        if self.bundles.contains_key(&code) {
            return AddOutcome::AlreadyResolved;
        }
        if self.in_flight.contains_key(&code) {
            return AddOutcome::InFlight;
        }

        if !self.active.contains(&code) {
            self.active.push(code.clone());
        }
        self.failed.remove(&code);
        self.last_error = None;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight.insert(code.clone(), ticket);

        debug!("Store: requesting {} via {} (ticket {})", code, self.source.name(), ticket);

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_series(&code).await;
            // The store may already be gone
            let _ = tx.send(FetchCompletion { code, ticket, result });
        });

        AddOutcome::Requested
    }

    /// Drop `code` and its bundle. Idempotent; returns whether anything was removed.
    /// An in-flight request is not aborted, its response is discarded on arrival.
    pub fn remove(&mut self, code: &str) -> bool {
        let code = normalize_code(code);
        let before = self.active.len();
        self.active.retain(|c| c != &code);

        let had_bundle = self.bundles.remove(&code).is_some();
        let had_request = self.in_flight.remove(&code).is_some();
        self.failed.remove(&code);

        debug!("Store: removed {}", code);
        had_bundle || had_request || before != self.active.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.bundles.clear();
        self.in_flight.clear();
        self.failed.clear();
        debug!("Store: cleared");
    }

    /// Apply a completion if it answers the latest request for its code.
    pub fn apply(&mut self, completion: FetchCompletion) -> StoreChange {
        let FetchCompletion { code, ticket, result } = completion;

        if self.in_flight.get(&code) != Some(&ticket) {
            warn!("Store: discarding stale response for {} (ticket {})", code, ticket);
            return StoreChange::Discarded { code };
        }
        self.in_flight.remove(&code);

        match result {
            Ok(bundle) => {
                debug!("Store: {} resolved with {} points", code, bundle.observation_count());
                self.bundles.insert(code.clone(), bundle);
                StoreChange::Resolved { code }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Store: fetch for {} failed: {}", code, message);
                self.failed.insert(code.clone());
                self.last_error = Some(message.clone());
                StoreChange::Failed { code, message }
            }
        }
    }

    /// Wait for the next completion and apply it. `None` once nothing is in flight.
    pub async fn next_event(&mut self) -> Option<StoreChange> {
        if self.in_flight.is_empty() {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply one already-delivered completion without waiting.
    pub fn poll_event(&mut self) -> Option<StoreChange> {
        let completion = self.rx.try_recv().ok()?;
        Some(self.apply(completion))
    }

    pub fn active_codes(&self) -> &[String] {
        &self.active
    }

    pub fn bundle(&self, code: &str) -> Option<&SeriesBundle> {
        self.bundles.get(&normalize_code(code))
    }

    pub fn bundles(&self) -> &HashMap<String, SeriesBundle> {
        &self.bundles
    }

    /// Resolved bundles in active order.
    pub fn resolved(&self) -> impl Iterator<Item = &SeriesBundle> {
        self.active.iter().filter_map(|code| self.bundles.get(code))
    }

    pub fn status(&self, code: &str) -> Option<SeriesStatus> {
        let code = normalize_code(code);
        if self.bundles.contains_key(&code) {
            Some(SeriesStatus::Ready)
        } else if self.in_flight.contains_key(&code) {
            Some(SeriesStatus::Pending)
        } else if self.failed.contains(&code) {
            Some(SeriesStatus::Failed)
        } else if self.active.contains(&code) {
            Some(SeriesStatus::Pending)
        } else {
            None
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Message of the most recent failed fetch, cleared when a new fetch starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
