pub mod extractor;
pub mod matcher;
pub mod record;

pub use extractor::Extractor;
pub use matcher::NameMatcher;
pub use record::TapeRecord;

use crate::error::{Result, TapeSieveError};
use regex::Regex;

/// Strips every whitespace run from a value.
///
/// Tape names arrive from spreadsheets with stray spaces, tabs, and
/// non-breaking padding; matching treats "A 100" and "A100" as the same
/// name, so normalization removes whitespace entirely rather than trimming
/// the ends.
#[derive(Debug, Clone)]
pub struct Normalizer {
    whitespace: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        let whitespace = Regex::new(r"\s+").map_err(|e| TapeSieveError::Config {
            message: format!("Failed to compile whitespace pattern: {}", e),
        })?;
        Ok(Self { whitespace })
    }

    pub fn normalize(&self, value: &str) -> String {
        self.whitespace.replace_all(value, "").into_owned()
    }
}
