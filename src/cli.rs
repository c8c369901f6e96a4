//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// SurveyScope - survey analytics from the command line
///
/// Summarizes the responses collected for one administrator's survey:
/// sentiment of free-text answers, rating and choice distributions, and
/// respondent demographics. Markdown/JSON reports.
///
/// Examples:
///   surveyscope --admin ana@example.com
///   surveyscope --admin ana@example.com --view sentiment --question Comments
///   surveyscope --admin ana@example.com --view quantitative --format json
///   surveyscope --admin ana@example.com --list-questions
///   surveyscope --admin ana@example.com --submit answers.json
///   surveyscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Administrator whose survey is analyzed (or receives a submission)
    #[arg(
        short,
        long,
        value_name = "EMAIL",
        env = "SURVEYSCOPE_ADMIN",
        required_unless_present = "init_config"
    )]
    pub admin: Option<String>,

    /// Which analysis to run
    #[arg(long, default_value = "overview", value_name = "VIEW")]
    pub view: View,

    /// Question prompt to analyze
    ///
    /// Used by the sentiment and quantitative views. Defaults to the first
    /// question of the matching kind.
    #[arg(long, value_name = "PROMPT")]
    pub question: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Survey store URL
    #[arg(long, value_name = "URL", env = "SURVEYSCOPE_STORE_URL")]
    pub store_url: Option<String>,

    /// Sentiment inference endpoint URL
    #[arg(long, value_name = "URL", env = "SURVEYSCOPE_CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Sentiment model identifier
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Request timeout in seconds for the store and the classifier
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveyscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the survey's questions grouped by kind and exit
    #[arg(long)]
    pub list_questions: bool,

    /// Submit a response read from a JSON file (prompt -> answer)
    #[arg(long, value_name = "FILE", conflicts_with = "list_questions")]
    pub submit: Option<PathBuf>,

    /// Print the anonymous survey link for --admin and exit
    #[arg(long)]
    pub share_link: bool,

    /// Generate a default .surveyscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Analytical view to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Quantitative and demographic views (no classifier calls)
    #[default]
    Overview,
    /// Sentiment of one free-text question
    Sentiment,
    /// Distribution of one multiple choice or rating question
    Quantitative,
    /// Breakdown of all demographic questions
    Demographics,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The administrator id; empty when not set (validated first).
    pub fn admin_id(&self) -> &str {
        self.admin.as_deref().unwrap_or("").trim()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.admin_id().is_empty() {
            return Err("Administrator must not be empty".to_string());
        }

        for (name, url) in [
            ("Store", self.store_url.as_deref()),
            ("Classifier", self.classifier_url.as_deref()),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("{} URL must start with 'http://' or 'https://'", name));
                }
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.question.is_some()
            && !matches!(self.view, View::Sentiment | View::Quantitative)
        {
            return Err(
                "--question applies only to the sentiment and quantitative views".to_string(),
            );
        }

        // Validate submission file if provided
        if let Some(ref path) = self.submit {
            if !path.is_file() {
                return Err(format!("Submission file does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` comes from the config file; `--quiet` still wins.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            admin: Some("ana@example.com".to_string()),
            view: View::Overview,
            question: None,
            output: None,
            format: OutputFormat::Markdown,
            store_url: None,
            classifier_url: None,
            model: None,
            timeout: None,
            config: None,
            verbose: false,
            quiet: false,
            list_questions: false,
            submit: None,
            share_link: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "surveyscope",
            "--admin",
            "ana@example.com",
            "--view",
            "sentiment",
            "--question",
            "Comments",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.admin_id(), "ana@example.com");
        assert_eq!(args.view, View::Sentiment);
        assert_eq!(args.question.as_deref(), Some("Comments"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_blank_admin() {
        let mut args = make_args();
        args.admin = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.store_url = Some("ftp://store".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_question_needs_selectable_view() {
        let mut args = make_args();
        args.question = Some("Comments".to_string());
        assert!(args.validate().is_err());

        args.view = View::Quantitative;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
