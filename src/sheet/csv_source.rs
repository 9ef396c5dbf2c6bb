use crate::error::{Result, TapeSieveError};
use crate::sheet::Sheet;
use std::path::Path;

/// Reads a CSV file into a [`Sheet`] grid.
///
/// The reader treats every line as data (no header row) and tolerates
/// records of differing widths; the grid pads short rows on access.
pub fn load_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TapeSieveError::SourceNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Sheet::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::ColumnRef;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_simple_grid() {
        let file = write_csv("A100,2024-01-01,Tape A\nB200,2024-01-02,Tape B\n");
        let sheet = load_sheet(file.path()).unwrap();

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.column_count(), 3);
        let a = ColumnRef::parse("A").unwrap();
        assert_eq!(sheet.cell(&a, 1), Some("B200"));
    }

    #[test]
    fn test_load_ragged_rows() {
        let file = write_csv("name,date,desc,extra\nshort\n");
        let sheet = load_sheet(file.path()).unwrap();

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.column_count(), 4);
        let d = ColumnRef::parse("D").unwrap();
        assert_eq!(sheet.column_values(&d), vec!["extra".to_string(), String::new()]);
    }

    #[test]
    fn test_missing_file() {
        let result = load_sheet("definitely/not/here.csv");
        assert!(matches!(
            result,
            Err(TapeSieveError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        let file = write_csv("");
        let sheet = load_sheet(file.path()).unwrap();
        assert_eq!(sheet.row_count(), 0);
    }
}
