use crate::analysis::DrugAnalysis;
use crate::history::{HistoryEntry, SessionHistory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failure,
}

/// Sequence number of a submitted query. Only the latest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// Owns what the screen shows: the current result, the error, the loading
/// flag and the session history.
#[derive(Debug, Default)]
pub struct Controller {
    current_result: Option<DrugAnalysis>,
    error_message: Option<String>,
    loading: bool,
    history: SessionHistory,
    latest_request: u64,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error_message.is_some() {
            Phase::Failure
        } else if self.current_result.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_result(&self) -> Option<&DrugAnalysis> {
        self.current_result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Start a query. Returns `None` for a blank query or while one is in flight.
    pub fn submit(&mut self, query: &str) -> Option<(RequestId, String)> {
        let query = query.trim();
        if query.is_empty() || self.loading {
            return None;
        }

        self.loading = true;
        self.error_message = None;
        self.current_result = None;
        self.latest_request += 1;

        Some((RequestId(self.latest_request), query.to_string()))
    }

    fn is_latest(&self, id: RequestId) -> bool {
        id.0 == self.latest_request
    }

    /// Returns false when the response is stale and was dropped.
    pub fn complete(&mut self, id: RequestId, analysis: DrugAnalysis) -> bool {
        if !self.is_latest(id) {
            return false;
        }

        self.loading = false;
        self.error_message = None;
        self.current_result = Some(analysis.clone());
        self.history.record(analysis);
        true
    }

    /// Returns false when the response is stale and was dropped.
    pub fn fail(&mut self, id: RequestId, message: String) -> bool {
        if !self.is_latest(id) {
            return false;
        }

        self.loading = false;
        self.current_result = None;
        self.error_message = Some(message);
        true
    }

    pub fn select_history(&mut self, entry_id: &str) -> Option<&HistoryEntry> {
        let entry = self.history.get(entry_id)?;
        self.current_result = Some(entry.analysis.clone());
        self.error_message = None;
        Some(entry)
    }
}
