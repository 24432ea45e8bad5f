use std::collections::VecDeque;

use crate::analysis::DrugAnalysis;

pub const HISTORY_CAPACITY: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    #[allow(dead_code)]
    pub recorded_at: i64,
    pub analysis: DrugAnalysis,
}

/// Recent lookups for this session, most recent first, one per subject name.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    next_seq: u64,
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, analysis: DrugAnalysis) -> &HistoryEntry {
        let key = analysis.subject_name.to_lowercase();
        self.entries
            .retain(|e| e.analysis.subject_name.to_lowercase() != key);

        self.next_seq += 1;
        let recorded_at = now_millis();
        let entry = HistoryEntry {
            id: format!("{}-{}", recorded_at, self.next_seq),
            recorded_at,
            analysis,
        };

        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);

        &self.entries[0]
    }

    pub fn list(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
