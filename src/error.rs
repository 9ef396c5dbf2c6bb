use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapeSieveError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read tabular data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid column selector: {token}")]
    InvalidColumn { token: String },

    #[error("Source sheet has no column {column}")]
    MissingColumn { column: String },

    #[error("Column {column} is hidden in the source sheet")]
    HiddenColumn { column: String },

    #[error("Column {column} has {found} usable rows, expected {expected}")]
    ColumnMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Source sheet contains no usable rows")]
    EmptySource,

    #[error("Source file not found: {path}")]
    SourceNotFound { path: String },

    #[error("Input folder has no spreadsheet to read: {path}")]
    InputFolderEmpty { path: String },

    #[error("Failed to write {path}")]
    FatalWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to watch {path} for release")]
    Watch {
        path: String,
        #[source]
        source: notify::Error,
    },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for TapeSieveError {
    fn user_message(&self) -> String {
        match self {
            TapeSieveError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            TapeSieveError::InvalidColumn { token } => {
                format!("Invalid column selector: {}", token)
            }
            TapeSieveError::MissingColumn { column } => {
                format!("The source sheet has no column {}", column)
            }
            TapeSieveError::HiddenColumn { column } => {
                format!("Column {} is hidden in the source sheet", column)
            }
            TapeSieveError::ColumnMismatch {
                column,
                expected,
                found,
            } => {
                format!(
                    "Column {} has {} usable rows where {} were expected",
                    column, found, expected
                )
            }
            TapeSieveError::EmptySource => {
                "The source sheet contains no usable rows".to_string()
            }
            TapeSieveError::SourceNotFound { path } => {
                format!("No such file exists: {}", path)
            }
            TapeSieveError::InputFolderEmpty { path } => {
                format!("Input folder is empty or missing: {}", path)
            }
            TapeSieveError::FatalWrite { path, source } => {
                format!("Failed to write {}: {}", path, source)
            }
            TapeSieveError::Watch { path, source } => {
                format!("Failed to watch {} for release: {}", path, source)
            }
            TapeSieveError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TapeSieveError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config."
                    .to_string(),
            ),
            TapeSieveError::InvalidColumn { .. } => Some(
                "Column selectors are spreadsheet-style letters, e.g. A,B,D.".to_string(),
            ),
            TapeSieveError::MissingColumn { .. } => Some(
                "Verify the sheet layout matches the columns configured under [source]."
                    .to_string(),
            ),
            TapeSieveError::HiddenColumn { .. } => Some(
                "Unhide the column in the source sheet and run again; hidden columns usually mean the sheet layout has changed."
                    .to_string(),
            ),
            TapeSieveError::ColumnMismatch { .. } => Some(
                "The selected columns have differing numbers of filled cells. Check the sheet for stray values above or below the data."
                    .to_string(),
            ),
            TapeSieveError::EmptySource => Some(
                "Check that the file you pasted actually contains data rows.".to_string(),
            ),
            TapeSieveError::SourceNotFound { .. } => Some(
                "Double-check the path, or type 'Input' to use the configured input folder."
                    .to_string(),
            ),
            TapeSieveError::InputFolderEmpty { .. } => Some(
                "Place the spreadsheet in the input folder, or paste its full path instead."
                    .to_string(),
            ),
            TapeSieveError::FatalWrite { .. } => Some(
                "Ensure the output folder exists and is writable, then run again.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for TapeSieveError {
    fn from(error: toml::de::Error) -> Self {
        TapeSieveError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TapeSieveError>;
