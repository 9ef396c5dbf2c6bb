use clap::Parser;
use std::process;
use tapesieve::{Cli, TapeSieve, TapeSieveError, UserFriendlyError};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let sieve = match TapeSieve::from_cli(&cli) {
        Ok(sieve) => sieve,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    match sieve
        .reconcile(cli.source.as_deref(), cli.names_file.as_deref())
        .await
    {
        Ok(summary) => {
            sieve.reporter().info(&summary.display_summary());
            0
        }
        Err(e) => {
            sieve.handle_error(&e);

            // Map error types to appropriate exit codes
            match e {
                TapeSieveError::Cancelled => 130, // Interrupted (SIGINT)
                TapeSieveError::Config { .. } | TapeSieveError::InvalidColumn { .. } => 2,
                TapeSieveError::SourceNotFound { .. }
                | TapeSieveError::InputFolderEmpty { .. } => 3,
                TapeSieveError::MissingColumn { .. }
                | TapeSieveError::HiddenColumn { .. }
                | TapeSieveError::ColumnMismatch { .. }
                | TapeSieveError::EmptySource => 4,
                TapeSieveError::FatalWrite { .. } => 5,
                TapeSieveError::Watch { .. } => 6,
                _ => 1, // General error
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "tapesieve.toml".to_string());

    match TapeSieve::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  tapesieve --config {}", config_path);
            println!("\nEdit the file to customize folders and column letters.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &TapeSieveError) {
    // Create a basic reporter for startup errors
    let reporter = tapesieve::Reporter::new(tapesieve::OutputMode::Human, 0, false, None);
    reporter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::parse_from([
            "tapesieve",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[source]"));
        assert!(content.contains("[output]"));
    }

    #[test]
    fn test_generate_config_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("no/such/dir/test.toml");

        let cli = Cli::parse_from([
            "tapesieve",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 1);
    }
}
