use crate::error::{TapeSieveError, UserFriendlyError};
use chrono::Local;
use console::{style, Emoji, Term};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageLevel {
    System,
    Success,
    Info,
    Warning,
    Error,
    Critical,
    Debug,
}

impl MessageLevel {
    fn label(self) -> &'static str {
        match self {
            MessageLevel::System => "System",
            MessageLevel::Success => "Success",
            MessageLevel::Info => "Info",
            MessageLevel::Warning => "Warning",
            MessageLevel::Error => "Error",
            MessageLevel::Critical => "CriticalError",
            MessageLevel::Debug => "Debug",
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");

/// Leveled notification sink: colored console output plus a durable,
/// timestamped log file named after the current date.
///
/// Every message goes to the log when a log path is set, whatever the
/// console verbosity; the console side is gated by mode, verbosity, and
/// quiet. Cloned freely into the saver's replay tasks.
#[derive(Clone)]
pub struct Reporter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
    log_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool, log_path: Option<PathBuf>) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
            log_path,
        }
    }

    /// The date-derived log file inside `dir`, e.g.
    /// `Logs/Wednesday-06-August-2026.log`.
    pub fn log_file_in(dir: &Path) -> PathBuf {
        dir.join(format!("{}.log", Local::now().format("%A-%d-%B-%Y")))
    }

    // Core messaging methods; one per state transition the pipeline emits.

    pub fn system(&self, message: &str) {
        if !self.quiet {
            self.print_console(MessageLevel::System, message);
        }
        self.append_log(MessageLevel::System, message);
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_console(MessageLevel::Success, message);
        }
        self.append_log(MessageLevel::Success, message);
    }

    pub fn info(&self, message: &str) {
        if self.verbose_level >= 1 {
            self.print_console(MessageLevel::Info, message);
        }
        self.append_log(MessageLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.print_console(MessageLevel::Warning, message);
        }
        self.append_log(MessageLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.print_console(MessageLevel::Error, message);
        self.append_log(MessageLevel::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.print_console(MessageLevel::Critical, message);
        self.append_log(MessageLevel::Critical, message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbose_level >= 2 {
            self.print_console(MessageLevel::Debug, message);
        }
        self.append_log(MessageLevel::Debug, message);
    }

    /// Records a message in the log file without echoing it to the console.
    pub fn log_debug(&self, message: &str) {
        self.append_log(MessageLevel::Debug, message);
    }

    pub fn print_user_friendly_error(&self, error: &TapeSieveError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Writes the end-of-session marker to the log file.
    pub fn finish_log(&self) {
        if self.log_path.is_none() {
            return;
        }
        self.write_log_line(&format!("Log End: {}.\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
    }

    // Private helper methods

    fn print_console(&self, level: MessageLevel, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human(level, message),
            OutputMode::Json => self.print_json_message(level, message),
            OutputMode::Plain => match level {
                MessageLevel::Error | MessageLevel::Critical => {
                    eprintln!("{}: {}", level.label().to_uppercase(), message)
                }
                _ => println!("{}: {}", level.label().to_uppercase(), message),
            },
        }
    }

    fn print_human(&self, level: MessageLevel, message: &str) {
        if self.use_colors {
            let styled = match level {
                MessageLevel::System => style(message).cyan().to_string(),
                MessageLevel::Success => format!("{}{}", CHECKMARK, style(message).green().bold()),
                MessageLevel::Info => format!("{}{}", INFO, style(message).cyan()),
                MessageLevel::Warning => format!("{}{}", WARNING, style(message).yellow().bold()),
                MessageLevel::Error => format!("{}{}", CROSS, style(message).red().bold()),
                MessageLevel::Critical => {
                    format!("{}{}", CROSS, style(message).red().bold().underlined())
                }
                MessageLevel::Debug => format!("  {}", style(message).dim()),
            };
            match level {
                MessageLevel::Error | MessageLevel::Critical => eprintln!("{}", styled),
                _ => println!("{}", styled),
            }
        } else {
            let prefix = match level {
                MessageLevel::System => ">",
                MessageLevel::Success => "✓",
                MessageLevel::Info => "i",
                MessageLevel::Warning => "!",
                MessageLevel::Error => "✗",
                MessageLevel::Critical => "✗✗",
                MessageLevel::Debug => "·",
            };
            match level {
                MessageLevel::Error | MessageLevel::Critical => {
                    eprintln!("{} {}", prefix, message)
                }
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: MessageLevel, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level.label(),
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn append_log(&self, level: MessageLevel, message: &str) {
        if self.log_path.is_none() {
            return;
        }
        let line = format!(
            "[{}]\t[{}] {}\n",
            level.label(),
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        self.write_log_line(&line);
    }

    fn write_log_line(&self, line: &str) {
        let Some(ref path) = self.log_path else {
            return;
        };

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(line.as_bytes())
        })();

        // Console only; another log write would just fail the same way.
        if let Err(error) = result {
            eprintln!(
                "There was an error writing the log at {}: {}",
                path.display(),
                error
            );
        }
    }
}
