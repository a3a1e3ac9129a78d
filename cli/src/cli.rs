use clap::{Parser, Subcommand, ValueEnum};
use ocr_client::config::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use ocr_client::{ClientConfig, OcrClientError};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ocr")]
#[command(
    author,
    version,
    about = "Extract text from images with a remote OCR backend"
)]
pub struct Cli {
    /// Backend origin (also read from OCR_API_BASE_URL or a .env file)
    #[clap(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client configuration for the selected backend
    pub fn client_config(&self, timeout_secs: u64) -> Result<ClientConfig, OcrClientError> {
        ClientConfig::builder()
            .base_url(self.api_url.as_str())
            .timeout(Duration::from_secs(timeout_secs))
            .build()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload an image and print the recognized text
    Process {
        /// Image to process, or `-` to read from stdin
        input: PathBuf,

        /// File name to use for stdin input (its extension is validated)
        #[clap(short, long)]
        name: Option<String>,

        /// How to print the results
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Copy the extracted text to the clipboard
        #[clap(short, long, default_value_t = false)]
        copy: bool,

        /// Save the extracted text as ocr-text-<millis>.txt
        #[clap(long, default_value_t = false)]
        save_text: bool,

        /// Save the full result as ocr-results-<millis>.json
        #[clap(long, default_value_t = false)]
        save_json: bool,

        /// Directory for saved files (defaults to the current directory)
        #[clap(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Request timeout in seconds
        #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Offer retry on failure with dialog prompts
        #[clap(short, long, default_value_t = false)]
        interactive: bool,

        /// Do not probe the backend before uploading
        #[clap(long, default_value_t = false)]
        skip_health_check: bool,

        /// Enable verbose output with additional information
        #[clap(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Check whether the backend is reachable
    Health {
        /// Enable verbose output with additional information
        #[clap(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Show what the backend supports
    Info {
        /// Print the raw service description as JSON
        #[clap(long, default_value_t = false)]
        json: bool,

        /// Enable verbose output with additional information
        #[clap(short, long, default_value_t = false)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Self::Process { verbose, .. } | Self::Health { verbose } | Self::Info { verbose, .. } => {
                *verbose
            }
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Summary line plus the extracted text - default
    Summary,

    /// Only the extracted text, for piping
    Text,

    /// Summary plus a per-block table with confidence and position
    Table,

    /// The full result as JSON
    Json,
}

impl OutputFormat {
    /// Whether status chatter may be printed next to the results
    pub fn is_human(&self) -> bool {
        matches!(self, Self::Summary | Self::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_defaults() {
        let cli = Cli::try_parse_from(["ocr", "process", "photo.png"]).unwrap();
        let Commands::Process {
            input,
            format,
            timeout,
            output_dir,
            copy,
            ..
        } = &cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(input, &PathBuf::from("photo.png"));
        assert_eq!(*format, OutputFormat::Summary);
        assert_eq!(*timeout, 60);
        assert_eq!(output_dir, &PathBuf::from("."));
        assert!(!copy);
        assert!(!cli.command.verbose());
    }

    #[test]
    fn test_process_flags() {
        let cli = Cli::try_parse_from([
            "ocr",
            "process",
            "-",
            "--name",
            "scan.jpg",
            "--format",
            "json",
            "--save-text",
            "--save-json",
            "--skip-health-check",
            "-v",
            "--api-url",
            "http://ocr.internal:8080",
        ])
        .unwrap();

        assert_eq!(cli.api_url, "http://ocr.internal:8080");
        assert!(cli.command.verbose());
        let Commands::Process {
            name,
            format,
            save_text,
            save_json,
            skip_health_check,
            ..
        } = cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(name.as_deref(), Some("scan.jpg"));
        assert_eq!(format, OutputFormat::Json);
        assert!(save_text && save_json && skip_health_check);
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::try_parse_from(["ocr", "health", "--api-url", "https://ocr.example.com"]).unwrap();
        let config = cli.client_config(5).unwrap();
        assert_eq!(config.display_url(), "https://ocr.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["ocr", "process", "a.png", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_output_format_audience() {
        assert!(OutputFormat::Summary.is_human());
        assert!(OutputFormat::Table.is_human());
        assert!(!OutputFormat::Text.is_human());
        assert!(!OutputFormat::Json.is_human());
    }
}
