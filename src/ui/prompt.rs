use crate::error::{Result, TapeSieveError, UserFriendlyError};
use crate::ui::Reporter;
use console::Term;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the source entry that means "whatever is in the input folder".
const INPUT_KEYWORD: &str = "input";

/// Interactive console input: the pasted tape-name list and the source
/// path, with a re-prompt loop on invalid entries.
pub struct Prompter<'a> {
    term: Term,
    reporter: &'a Reporter,
}

impl<'a> Prompter<'a> {
    pub fn new(reporter: &'a Reporter) -> Self {
        Self {
            term: Term::stdout(),
            reporter,
        }
    }

    /// Reads tape names line by line until an empty line.
    pub fn collect_names(&self) -> Result<Vec<String>> {
        self.reporter
            .system("Please paste in the list of tape names we need.");
        self.reporter.system("Double press 'Return' when completed.");

        let mut entries = Vec::new();
        loop {
            let line = self.term.read_line()?;
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            entries.push(line.to_string());
        }
        Ok(entries)
    }

    /// Resolves the source path, prompting until a usable entry arrives.
    ///
    /// An explicit `initial` entry (from the CLI) is resolved once and its
    /// failure is final; interactive entries warn and re-prompt, as long as
    /// the session has not been cancelled.
    pub fn resolve_source(
        &self,
        initial: Option<&str>,
        input_folder: &Path,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<PathBuf> {
        if let Some(entry) = initial {
            return resolve_entry(entry, input_folder);
        }

        loop {
            if cancelled() {
                return Err(TapeSieveError::Cancelled);
            }

            self.reporter
                .system("Please paste the directory to the spreadsheet.");
            let entry = self.term.read_line()?;
            self.reporter
                .log_debug(&format!("User entered: {}", entry));

            match resolve_entry(entry.trim(), input_folder) {
                Ok(path) => return Ok(path),
                Err(error) => {
                    self.reporter
                        .warning(&format!("{} Please try again.", error.user_message()));
                }
            }
        }
    }
}

/// Reads a line-delimited names file, dropping blank lines.
pub fn read_names_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(TapeSieveError::SourceNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Maps one source entry to a file path: either a literal path, or the
/// input-folder keyword.
pub fn resolve_entry(entry: &str, input_folder: &Path) -> Result<PathBuf> {
    if entry.eq_ignore_ascii_case(INPUT_KEYWORD) {
        return first_sheet_in(input_folder);
    }

    let path = PathBuf::from(entry);
    if path.is_file() {
        Ok(path)
    } else {
        Err(TapeSieveError::SourceNotFound {
            path: entry.to_string(),
        })
    }
}

/// The first non-`.txt` file in the input folder, by name.
///
/// Text files share the folder with the spreadsheets (name lists dropped
/// alongside the inventory), so they are skipped.
fn first_sheet_in(folder: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(folder).map_err(|_| TapeSieveError::InputFolderEmpty {
        path: folder.display().to_string(),
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| !ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(true)
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| TapeSieveError::InputFolderEmpty {
            path: folder.display().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_entry_with_literal_path() {
        let dir = TempDir::new().unwrap();
        let sheet = dir.path().join("inventory.csv");
        fs::write(&sheet, "A100,2024-01-01,Tape A\n").unwrap();

        let resolved = resolve_entry(sheet.to_str().unwrap(), dir.path()).unwrap();
        assert_eq!(resolved, sheet);
    }

    #[test]
    fn test_resolve_entry_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = resolve_entry("nowhere/at/all.csv", dir.path());
        assert!(matches!(result, Err(TapeSieveError::SourceNotFound { .. })));
    }

    #[test]
    fn test_input_keyword_selects_first_non_text_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("aaa.txt"), "names").unwrap();
        fs::write(dir.path().join("bbb.csv"), "data").unwrap();
        fs::write(dir.path().join("ccc.csv"), "data").unwrap();

        let resolved = resolve_entry("Input", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("bbb.csv"));
    }

    #[test]
    fn test_input_keyword_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sheet.csv"), "data").unwrap();
        assert!(resolve_entry("INPUT", dir.path()).is_ok());
        assert!(resolve_entry("input", dir.path()).is_ok());
    }

    #[test]
    fn test_input_folder_with_only_text_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("names.txt"), "A100").unwrap();

        let result = resolve_entry("Input", dir.path());
        assert!(matches!(
            result,
            Err(TapeSieveError::InputFolderEmpty { .. })
        ));
    }

    #[test]
    fn test_missing_input_folder() {
        let result = resolve_entry("Input", Path::new("no/such/folder"));
        assert!(matches!(
            result,
            Err(TapeSieveError::InputFolderEmpty { .. })
        ));
    }

    #[test]
    fn test_read_names_file_drops_blanks() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("names.txt");
        fs::write(&list, "A100\n\n  B200  \n\n").unwrap();

        let names = read_names_file(&list).unwrap();
        assert_eq!(names, vec!["A100".to_string(), "B200".to_string()]);
    }

    #[test]
    fn test_read_names_file_missing() {
        let result = read_names_file(Path::new("no/names.txt"));
        assert!(matches!(result, Err(TapeSieveError::SourceNotFound { .. })));
    }
}
