//! Command-line interface for crawl-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Resolution of the settings for one export run

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, ExportSettings, LogLevel, OutputFormat};
use crate::error::{ConfigError, Result};
use crate::record::Projection;

/// Export every URL and publish date stored in a crawl index
#[derive(Parser, Debug)]
#[command(
    name = "crawl-export",
    version,
    about = "Export URLs and publish dates from a crawl index",
    long_about = "Pages through an entire search index with the scroll API and prints one
`url<TAB>publishDate` line per article document.",
    disable_help_flag = true
)]
pub struct CliArgs {
    /// Index to export (required)
    #[arg(short = 'i', long, value_name = "INDEX")]
    pub index: Option<String>,

    /// Cluster host [default: localhost]
    #[arg(short = 'h', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Cluster HTTP port [default: 9200]
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of hits per scroll page [default: 1000]
    #[arg(short = 's', long = "size", value_name = "SIZE")]
    pub page_size: Option<u32>,

    /// Document type to search [default: article]
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub record_type: Option<String>,

    /// Retrieve full documents instead of url and publishDate only
    #[arg(long)]
    pub full: bool,

    /// Output format (tsv, jsonl)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for crawl-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or validate configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build the interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the settings of one export run
    ///
    /// Fails when no index was given; this happens before any request.
    pub fn export_settings(&self) -> Result<ExportSettings> {
        let index = self
            .args
            .index
            .as_deref()
            .map(str::trim)
            .filter(|index| !index.is_empty())
            .ok_or_else(|| ConfigError::MissingField("index (-i <INDEX>)".to_string()))?;

        Ok(ExportSettings {
            host: self.config.connection.host.clone(),
            port: self.config.connection.port,
            index: index.to_string(),
            record_type: self.config.export.record_type.clone(),
            page_size: self.config.export.page_size,
            projection: if self.args.full {
                Projection::Source
            } else {
                Projection::url_and_publish_date()
            },
            format: self.config.export.format,
            output: self.args.output.clone(),
            progress: self.args.progress,
        })
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        Self::apply_connection_args(config, args);
        Self::apply_export_args(config, args)?;
        Self::apply_logging_args(config, args);
        Ok(())
    }

    /// Apply connection-related CLI arguments to configuration
    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            config.connection.port = port;
        }
    }

    /// Apply export-related CLI arguments to configuration
    fn apply_export_args(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(page_size) = args.page_size {
            config.export.page_size = page_size;
        }
        if let Some(record_type) = &args.record_type {
            config.export.record_type = record_type.clone();
        }
        if let Some(format_str) = &args.format {
            config.export.format = Self::parse_output_format(format_str)?;
        }
        Ok(())
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Parse output format string
    fn parse_output_format(format_str: &str) -> Result<OutputFormat> {
        match format_str.to_lowercase().as_str() {
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "jsonl" | "json-lines" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: format_str.to_string(),
            }
            .into()),
        }
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Config { show, validate }) => {
                if *validate {
                    // load_config already validated; reaching here means it passed
                    println!("Configuration is valid: {}", self.config_path().display());
                }
                if *show {
                    self.show_config()?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        println!("# {}", self.config_path().display());
        println!("{}", rendered);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}
