use crate::pipeline::{Normalizer, TapeRecord};

/// Filters extracted records down to the names the caller asked for.
///
/// Matching is exact (not substring) on the normalized name, ignoring case.
/// The filter is stable: matches come out in the order the records went in,
/// not in desired-list order. A record is appended once per matching desired
/// entry, so a desired list containing the same name twice yields the record
/// twice.
pub struct NameMatcher {
    desired: Vec<String>,
}

impl NameMatcher {
    pub fn new(desired: &[String], normalizer: &Normalizer) -> Self {
        let desired = desired
            .iter()
            .map(|entry| normalizer.normalize(entry))
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { desired }
    }

    pub fn desired_count(&self) -> usize {
        self.desired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.desired.is_empty()
    }

    pub fn filter(&self, records: &[TapeRecord]) -> Vec<TapeRecord> {
        let mut matched = Vec::new();
        for candidate in records {
            let candidate_name = candidate.name.to_lowercase();
            for entry in &self.desired {
                if entry.to_lowercase() == candidate_name {
                    matched.push(candidate.clone());
                }
            }
        }
        matched
    }
}
