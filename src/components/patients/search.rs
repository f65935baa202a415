//! Name search over the patient list.

use crate::models::PatientRecord;

/// Records whose name contains `query` (trimmed, case-insensitive), in list
/// order. A blank query matches everything.
#[cfg(test)]
pub fn filter_patients<'a>(patients: &'a [PatientRecord], query: &str) -> Vec<&'a PatientRecord> {
    matching_indices(patients, query)
        .into_iter()
        .map(|i| &patients[i])
        .collect()
}

/// Positions of the records whose name contains `query`, trimmed and
/// case-insensitive, in list order. A blank query matches everything.
pub fn matching_indices(patients: &[PatientRecord], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    patients
        .iter()
        .enumerate()
        .filter(|(_, p)| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Cached search result, recomputed only when the list or the query moves.
#[derive(Debug, Default)]
pub struct SearchView {
    query: String,
    revision: u64,
    computed_for: Option<(u64, String)>,
    indices: Vec<usize>,
}

impl SearchView {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop(&mut self) {
        self.query.pop();
    }

    /// Marks the underlying list as changed.
    pub fn invalidate(&mut self) {
        self.revision += 1;
    }

    /// Brings the cached positions up to date. Returns `true` if a
    /// recomputation actually happened.
    pub fn refresh(&mut self, patients: &[PatientRecord]) -> bool {
        let key = (self.revision, self.query.clone());
        if self.computed_for.as_ref() == Some(&key) {
            return false;
        }
        self.indices = matching_indices(patients, &self.query);
        self.computed_for = Some(key);
        true
    }

    /// Positions into the list as of the last [`refresh`](Self::refresh).
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}
