use crate::pipeline::TapeRecord;
use std::fs;
use std::io;
use std::path::Path;

/// A payload the [`DurableSaver`](crate::saver::DurableSaver) can persist.
///
/// Implementations own their content outright; the saver captures payloads
/// by value so a deferred retry always writes exactly what was handed in,
/// whatever happens to the caller's data afterwards.
pub trait Persist: Send {
    fn persist(&self, destination: &Path) -> io::Result<()>;

    /// Short label used in notifications ("spreadsheet", "text list").
    fn kind(&self) -> &'static str;
}

/// Three-column tabular payload written as CSV rows in filtered order.
pub struct SheetPayload {
    records: Vec<TapeRecord>,
}

impl SheetPayload {
    pub fn new(records: Vec<TapeRecord>) -> Self {
        Self { records }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

impl Persist for SheetPayload {
    fn persist(&self, destination: &Path) -> io::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(destination)
            .map_err(csv_io)?;

        for record in &self.records {
            writer.serialize(record).map_err(csv_io)?;
        }

        writer.flush()
    }

    fn kind(&self) -> &'static str {
        "spreadsheet"
    }
}

/// Newline-joined text payload; one matched name per line.
pub struct TextPayload {
    content: String,
}

impl TextPayload {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        Self { content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Persist for TextPayload {
    fn persist(&self, destination: &Path) -> io::Result<()> {
        fs::write(destination, &self.content)
    }

    fn kind(&self) -> &'static str {
        "text list"
    }
}

/// Unwraps the IO cause from a csv error so the saver can classify it.
fn csv_io(error: csv::Error) -> io::Error {
    match error.into_kind() {
        csv::ErrorKind::Io(io_error) => io_error,
        other => io::Error::other(format!("CSV serialization failed: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, date: &str, description: &str) -> TapeRecord {
        TapeRecord::new(name.to_string(), date.to_string(), description.to_string())
    }

    #[test]
    fn test_sheet_payload_writes_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("out.csv");
        let payload = SheetPayload::new(vec![
            record("A100", "2024-01-01", "Tape A"),
            record("B200", "2024-01-02", "Tape B"),
        ]);

        payload.persist(&destination).unwrap();

        let content = fs::read_to_string(&destination).unwrap();
        assert_eq!(content, "A100,2024-01-01,Tape A\nB200,2024-01-02,Tape B\n");
    }

    #[test]
    fn test_text_payload_one_name_per_line() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("out.txt");
        let payload = TextPayload::from_lines(["A100", "B200"]);

        payload.persist(&destination).unwrap();

        let content = fs::read_to_string(&destination).unwrap();
        assert_eq!(content, "A100\nB200\n");
    }

    #[test]
    fn test_empty_payloads_produce_empty_files() {
        let dir = TempDir::new().unwrap();

        let sheet_dest = dir.path().join("empty.csv");
        SheetPayload::new(Vec::new()).persist(&sheet_dest).unwrap();
        assert_eq!(fs::read_to_string(&sheet_dest).unwrap(), "");

        let text_dest = dir.path().join("empty.txt");
        TextPayload::from_lines(Vec::<String>::new())
            .persist(&text_dest)
            .unwrap();
        assert_eq!(fs::read_to_string(&text_dest).unwrap(), "");
    }

    #[test]
    fn test_missing_parent_surfaces_io_error() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("no/such/dir/out.csv");
        let payload = SheetPayload::new(vec![record("A100", "", "")]);

        let error = payload.persist(&destination).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
