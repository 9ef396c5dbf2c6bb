use serde::Serialize;
use std::fmt;

/// One matched inventory row: a tape name plus the two display fields that
/// travel with it into the output sheet.
///
/// Records are only built once all three source cells have been read and
/// normalized, and are immutable afterwards. The return date and description
/// are opaque display values; only the name participates in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeRecord {
    pub name: String,
    pub return_date: String,
    pub description: String,
}

impl TapeRecord {
    pub fn new(name: String, return_date: String, description: String) -> Self {
        Self {
            name,
            return_date,
            description,
        }
    }
}

impl fmt::Display for TapeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_name() {
        let record = TapeRecord::new(
            "A100".to_string(),
            "2024-01-01".to_string(),
            "Tape A".to_string(),
        );
        assert_eq!(record.to_string(), "A100");
    }

    #[test]
    fn test_empty_fields_are_allowed() {
        let record = TapeRecord::new("A100".to_string(), String::new(), String::new());
        assert_eq!(record.return_date, "");
        assert_eq!(record.description, "");
    }
}
