pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod saver;
pub mod sheet;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, LoggingConfig, OutputConfig, SourceConfig};
pub use error::{Result, TapeSieveError, UserFriendlyError};

// Core functionality re-exports
pub use pipeline::{Extractor, NameMatcher, Normalizer, TapeRecord};
pub use saver::{DurableSaver, Persist, SaveOutcome, SheetPayload, TextPayload};
pub use sheet::{load_sheet, ColumnRef, Sheet};
pub use ui::{GracefulShutdown, OutputMode, Prompter, Reporter};

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main library interface: one reconciliation run from prompt to output.
pub struct TapeSieve {
    config: Config,
    reporter: Reporter,
    shutdown: GracefulShutdown,
}

impl TapeSieve {
    /// Create a new TapeSieve instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let log_path = config
            .logging
            .enabled
            .then(|| Reporter::log_file_in(&config.logging.directory));
        let reporter = Reporter::new(output_mode, verbose, quiet, log_path);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            reporter,
            shutdown,
        })
    }

    /// Create a new TapeSieve instance for testing (no signal handler conflicts)
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let log_path = config
            .logging
            .enabled
            .then(|| Reporter::log_file_in(&config.logging.directory));
        let reporter = Reporter::new(output_mode, verbose, quiet, log_path);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            reporter,
            shutdown,
        }
    }

    /// Create a TapeSieve instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Run one reconciliation: collect the desired names, extract and filter
    /// the source sheet, and write the two dated output artifacts.
    pub async fn reconcile(
        &self,
        source: Option<&str>,
        names_file: Option<&Path>,
    ) -> Result<ReconcileSummary> {
        self.shutdown.check_shutdown()?;

        // Step 1: the desired-name list, pasted or from a file.
        let prompter = Prompter::new(&self.reporter);
        let mut desired = match names_file {
            Some(path) => ui::prompt::read_names_file(path)?,
            None => prompter.collect_names()?,
        };
        desired.sort();
        self.reporter
            .log_debug(&format!("User entered: {}", desired.join(", ")));
        if desired.is_empty() {
            self.reporter
                .warning("No tape names were entered; the outputs will be empty.");
        }

        // Step 2: the source sheet.
        self.shutdown.check_shutdown()?;
        let source_path = prompter.resolve_source(source, &self.config.source.input_folder, &|| {
            !self.shutdown.is_running()
        })?;
        self.reporter
            .info(&format!("Reading {}", source_path.display()));
        let sheet = sheet::load_sheet(&source_path)?;

        // Step 3: extract and sort.
        self.shutdown.check_shutdown()?;
        let extractor = Extractor::from_selectors(&self.config.source.columns)?;
        let mut records = extractor.extract(&sheet)?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        self.reporter.log_debug(&format!(
            "Tape names found: {}",
            join_names(records.iter().map(|r| r.name.as_str()))
        ));

        // Step 4: filter against the desired set.
        let matcher = NameMatcher::new(&desired, extractor.normalizer());
        let matched = matcher.filter(&records);
        self.reporter.log_debug(&format!(
            "Filtered list: {}",
            join_names(matched.iter().map(|r| r.name.as_str()))
        ));
        self.reporter.info(&format!(
            "Matched {} of {} inventory rows.",
            matched.len(),
            records.len()
        ));

        // Step 5: persist both artifacts; locked destinations are retried
        // once their holder lets go.
        self.shutdown.check_shutdown()?;
        fs::create_dir_all(&self.config.output.directory)?;
        let (sheet_output, text_output) = dated_output_paths(&self.config.output.directory);

        let saver = DurableSaver::new(self.reporter.clone());
        let names: Vec<String> = matched.iter().map(|r| r.name.clone()).collect();

        let sheet_result =
            saver.save_when_ready(SheetPayload::new(matched.clone()), sheet_output.clone());
        let text_result =
            saver.save_when_ready(TextPayload::from_lines(&names), text_output.clone());
        let deferred_writes = [&sheet_result, &text_result]
            .iter()
            .filter(|result| matches!(result, Ok(SaveOutcome::Deferred)))
            .count();

        if deferred_writes > 0 {
            self.reporter
                .system("Waiting for the locked output files to be released...");
        }
        // Drain before surfacing any fatal error so a deferred sibling write
        // is never left with a live watch.
        let drain_result = self.drain_saver(&saver).await;
        sheet_result?;
        text_result?;
        drain_result?;

        self.reporter
            .system("All finished. Check the output folder for the results :)");
        self.reporter.finish_log();

        Ok(ReconcileSummary {
            desired_names: desired.len(),
            extracted_rows: records.len(),
            matched_rows: matched.len(),
            sheet_output,
            text_output,
            deferred_writes,
        })
    }

    /// Awaits deferred writes, abandoning them if a shutdown arrives first.
    async fn drain_saver(&self, saver: &DurableSaver) -> Result<()> {
        let drain = saver.drain();
        tokio::pin!(drain);

        loop {
            tokio::select! {
                result = &mut drain => return result,
                _ = tokio::time::sleep(Duration::from_millis(250)) => {
                    if !self.shutdown.is_running() {
                        saver.abandon();
                        return Err(TapeSieveError::Cancelled);
                    }
                }
            }
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(TapeSieveError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &TapeSieveError) {
        self.reporter.print_user_friendly_error(error);
    }
}

/// Counts and artifact paths for one completed reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub desired_names: usize,
    pub extracted_rows: usize,
    pub matched_rows: usize,
    pub sheet_output: PathBuf,
    pub text_output: PathBuf,
    pub deferred_writes: usize,
}

impl ReconcileSummary {
    pub fn display_summary(&self) -> String {
        format!(
            "{} of {} rows matched {} desired names -> {} and {}",
            self.matched_rows,
            self.extracted_rows,
            self.desired_names,
            self.sheet_output.display(),
            self.text_output.display()
        )
    }
}

/// The two sibling output paths for today: `<dir>/MM-DD-YYYY.csv` and
/// `<dir>/MM-DD-YYYY.txt`.
fn dated_output_paths(directory: &Path) -> (PathBuf, PathBuf) {
    let base = Local::now().format("%m-%d-%Y").to_string();
    (
        directory.join(format!("{}.csv", base)),
        directory.join(format!("{}.txt", base)),
    )
}

fn join_names<'a, I: Iterator<Item = &'a str>>(names: I) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.source.input_folder = dir.path().join("Input");
        config.output.directory = dir.path().join("Output");
        config.logging.directory = dir.path().join("Logs");
        config
    }

    #[test]
    fn test_dated_output_paths_share_a_base_name() {
        let (sheet, text) = dated_output_paths(Path::new("Output"));
        assert_eq!(sheet.extension().unwrap(), "csv");
        assert_eq!(text.extension().unwrap(), "txt");
        assert_eq!(sheet.file_stem(), text.file_stem());

        let stem = sheet.file_stem().unwrap().to_string_lossy().to_string();
        let parts: Vec<_> = stem.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_tapesieve_creation() {
        let dir = TempDir::new().unwrap();
        let sieve = TapeSieve::new_for_test(test_config(&dir), OutputMode::Plain, 0, true);
        assert!(sieve.is_running());
        assert_eq!(sieve.config().source.columns, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_shutdown_handling() {
        let dir = TempDir::new().unwrap();
        let sieve = TapeSieve::new_for_test(test_config(&dir), OutputMode::Plain, 0, true);

        assert!(sieve.is_running());
        sieve.request_shutdown();
        assert!(!sieve.is_running());
    }

    #[tokio::test]
    async fn test_reconcile_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let source = dir.path().join("inventory.csv");
        fs::write(
            &source,
            "A100,2024-01-01,skip,Tape A\n\
             C300,2024-01-03,skip,Tape C\n\
             B200,2024-01-02,skip,Tape B\n",
        )
        .unwrap();

        let names_file = dir.path().join("wanted.txt");
        fs::write(&names_file, "b200\nA100\n").unwrap();

        let sieve = TapeSieve::new_for_test(config, OutputMode::Plain, 0, true);
        let summary = sieve
            .reconcile(Some(source.to_str().unwrap()), Some(&names_file))
            .await
            .unwrap();

        assert_eq!(summary.desired_names, 2);
        assert_eq!(summary.extracted_rows, 3);
        assert_eq!(summary.matched_rows, 2);
        assert_eq!(summary.deferred_writes, 0);

        // Records are sorted by name before filtering, so the artifacts are
        // alphabetical.
        let sheet_content = fs::read_to_string(&summary.sheet_output).unwrap();
        assert_eq!(
            sheet_content,
            "A100,2024-01-01,TapeA\nB200,2024-01-02,TapeB\n"
        );
        let text_content = fs::read_to_string(&summary.text_output).unwrap();
        assert_eq!(text_content, "A100\nB200\n");

        // The durable log captured the session.
        let log_path = Reporter::log_file_in(&sieve.config().logging.directory);
        let log_content = fs::read_to_string(&log_path).unwrap();
        assert!(log_content.contains("User entered: A100, b200"));
        assert!(log_content.contains("Log End:"));
    }

    #[tokio::test]
    async fn test_reconcile_with_empty_desired_list() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.logging.enabled = false;

        let source = dir.path().join("inventory.csv");
        fs::write(&source, "A100,2024-01-01,skip,Tape A\n").unwrap();
        let names_file = dir.path().join("wanted.txt");
        fs::write(&names_file, "\n").unwrap();

        let sieve = TapeSieve::new_for_test(config, OutputMode::Plain, 0, true);
        let summary = sieve
            .reconcile(Some(source.to_str().unwrap()), Some(&names_file))
            .await
            .unwrap();

        assert_eq!(summary.matched_rows, 0);
        assert_eq!(fs::read_to_string(&summary.sheet_output).unwrap(), "");
        assert_eq!(fs::read_to_string(&summary.text_output).unwrap(), "");
    }

    #[tokio::test]
    async fn test_reconcile_respects_shutdown() {
        let dir = TempDir::new().unwrap();
        let sieve = TapeSieve::new_for_test(test_config(&dir), OutputMode::Plain, 0, true);
        sieve.request_shutdown();

        let result = sieve.reconcile(Some("inventory.csv"), None).await;
        assert!(matches!(result, Err(TapeSieveError::Cancelled)));
    }

    #[tokio::test]
    async fn test_reconcile_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.logging.enabled = false;

        let names_file = dir.path().join("wanted.txt");
        fs::write(&names_file, "A100\n").unwrap();

        let sieve = TapeSieve::new_for_test(config, OutputMode::Plain, 0, true);
        let result = sieve
            .reconcile(Some("no/such/inventory.csv"), Some(&names_file))
            .await;
        assert!(matches!(result, Err(TapeSieveError::SourceNotFound { .. })));
    }

    #[test]
    fn test_sample_config_generation() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("sample.toml");

        TapeSieve::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[source]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[logging]"));
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
