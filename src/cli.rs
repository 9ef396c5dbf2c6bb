use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tapesieve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconcile a tape name list against a spreadsheet inventory")]
#[command(
    long_about = "TapeSieve filters the rows of a tabular inventory (CSV) down to the tape \
                  names you ask for, writing a filtered spreadsheet and a plain-text list \
                  of the matches. Outputs that are open in another program are written \
                  automatically once that program releases them."
)]
#[command(after_help = "EXAMPLES:\n  \
    tapesieve\n  \
    tapesieve inventory.csv --names-file wanted.txt\n  \
    tapesieve Input --columns A,B,D --output-dir Output\n  \
    tapesieve --generate-config")]
pub struct Cli {
    /// Path to the source spreadsheet, or the keyword 'Input' to use the
    /// first spreadsheet in the configured input folder. Prompted for when
    /// omitted.
    pub source: Option<String>,

    /// Read the desired tape names from a line-delimited text file instead
    /// of prompting
    #[arg(short, long)]
    pub names_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Column letters to extract (comma-separated, positionally name,
    /// return date, description)
    #[arg(long, value_parser = validate_column_list)]
    pub columns: Option<String>,

    /// Input folder scanned for the 'Input' keyword
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory the dated output files are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable the durable log file
    #[arg(long)]
    pub no_log: bool,

    /// Generate a sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_columns(self.columns.clone())
            .with_input_dir(self.input_dir.clone())
            .with_output_dir(self.output_dir.clone())
            .with_logging_enabled(if self.no_log { Some(false) } else { None })
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_column_list(s: &str) -> std::result::Result<String, String> {
    let columns: Vec<&str> = s
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    if columns.len() < 3 {
        return Err(format!(
            "At least 3 column letters are required (name, return date, description); got {}",
            columns.len()
        ));
    }

    for column in &columns {
        if !column.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!(
                "Invalid column letter '{}'. Columns are spreadsheet-style letters, e.g. A,B,D.",
                column
            ));
        }
    }

    Ok(s.to_string())
}
