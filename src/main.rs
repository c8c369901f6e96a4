//! SurveyScope - survey analytics CLI
//!
//! Fetches one administrator's survey questions and responses from the
//! store, and reports sentiment, answer distributions and demographic
//! breakdowns. Also accepts anonymous submissions for a survey.
//!
//! Exit codes:
//!   0 - Success (including surveys with no responses yet)
//!   1 - Runtime error (config, invalid arguments, submission rejected, etc.)
//!   3 - The store could not be reached; the report reflects missing data

mod analysis;
mod classifier;
mod cli;
mod config;
mod dashboard;
mod error;
mod form;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use classifier::{InferenceClassifier, InferenceConfig, SentimentClassifier};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dashboard::{build_report, needs_classifier, DashboardRequest};
use error::StoreError;
use indicatif::{ProgressBar, ProgressStyle};
use models::{QuestionKind, SentimentLabel, StoreStatus, ViewOutcome};
use std::path::{Path, PathBuf};
use store::{StoreConfig, SupabaseStore, SurveySnapshot};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code when the store was unavailable.
const EXIT_STORE_UNAVAILABLE: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so `[general] verbose` can apply
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("SurveyScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .surveyscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to point at your store, inference endpoint and model.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch to the requested mode. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let admin = args.admin_id().to_string();

    if args.share_link {
        let link = form::share_link(&config.general.form_base_url, &admin)?;
        println!("{}", link);
        return Ok(0);
    }

    let store = connect_store(&config)?;

    if let Some(ref path) = args.submit {
        return handle_submit(&admin, path, &store).await;
    }

    println!("📥 Loading survey data for {}", admin);
    let snapshot = SurveySnapshot::fetch(&admin, &store, &store).await;

    if args.list_questions {
        return Ok(handle_list_questions(&snapshot));
    }

    run_report(&args, &config, &snapshot).await
}

/// Build, write and summarize the report.
async fn run_report(args: &Args, config: &Config, snapshot: &SurveySnapshot) -> Result<i32> {
    // The classifier is built once and only for the view that needs it
    let classifier = if needs_classifier(args.view) && snapshot.has_responses() {
        Some(build_classifier(config)?)
    } else {
        None
    };

    let request = DashboardRequest {
        view: args.view,
        question: args.question.clone(),
        chart_max_distinct: config.report.chart_max_distinct,
    };

    let progress = classifier.as_ref().filter(|_| !args.quiet).map(|_| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} answers",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    });

    if classifier.is_some() {
        println!("🔬 Running sentiment analysis...");
    }

    let report = build_report(
        snapshot,
        &request,
        classifier.as_ref().map(|c| c as &dyn SentimentClassifier),
        progress.as_ref(),
    )
    .await?;

    if let Some(pb) = progress {
        pb.finish_with_message("Classification complete");
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report);
    println!("\n✅ Report saved to: {}", output_path.display());

    Ok(exit_code_for(&report.metadata.store_status))
}

/// Print a short console summary of the report.
fn print_summary(report: &dashboard::Report) {
    println!("\n📊 Survey Summary:");
    println!("   Questions: {}", report.metadata.question_count);
    println!("   Responses: {}", report.metadata.response_count);

    if !report.has_responses() {
        println!("   No feedback has been submitted yet.");
        return;
    }

    match &report.sentiment {
        Some(ViewOutcome::Ready(analysis)) => {
            println!(
                "   Sentiment of \"{}\": {} analyzed",
                analysis.prompt, analysis.summary.total
            );
            println!(
                "   Positive: {} | Neutral: {} | Negative: {}",
                analysis.summary.count(SentimentLabel::Positive),
                analysis.summary.count(SentimentLabel::Neutral),
                analysis.summary.count(SentimentLabel::Negative)
            );
            if let Some(rate) = analysis.summary.positive_rate {
                println!("   Positive rate: {:.1}%", rate);
            }
            if analysis.summary.failed > 0 {
                println!("   ⚠️  {} answers could not be classified", analysis.summary.failed);
            }
        }
        Some(ViewOutcome::NoData { prompt }) => {
            println!("   No answers submitted for \"{}\" yet.", prompt)
        }
        Some(ViewOutcome::NoQuestionsOfType(kind)) => {
            println!("   No {} questions available.", kind)
        }
        None => {}
    }

    for outcome in &report.quantitative {
        if let ViewOutcome::Ready(distribution) = outcome {
            println!(
                "   {}: {} answers across {} values",
                distribution.prompt,
                distribution.total(),
                distribution.entries.len()
            );
        }
    }

    if let Some(ViewOutcome::Ready(breakdown)) = &report.demographics {
        let suppressed = breakdown
            .questions
            .iter()
            .filter(|q| q.chart.is_suppressed())
            .count();
        println!(
            "   Demographic profiles: {} ({} questions, {} not charted)",
            breakdown.table.len(),
            breakdown.questions.len(),
            suppressed
        );
    }
}

/// Handle --list-questions: print the partitioned schema.
fn handle_list_questions(snapshot: &SurveySnapshot) -> i32 {
    let partition = analysis::partition_questions(&snapshot.questions);

    if partition.total() == 0 {
        println!("\n   This survey has no questions yet.");
    } else {
        for (title, kind) in [
            ("💬 Free-text", QuestionKind::FreeText),
            ("📊 Quantitative", QuestionKind::Quantitative),
            ("👥 Demographic", QuestionKind::Demographic),
        ] {
            println!("\n{}:", title);
            let prompts = partition.prompts(kind);
            if prompts.is_empty() {
                println!("     (none)");
            }
            for prompt in prompts {
                println!("     - {}", prompt);
            }
        }
    }
    println!("\n   Responses collected: {}", snapshot.responses.len());

    exit_code_for(&snapshot.status)
}

/// Handle --submit: validate a JSON answer file and store it.
async fn handle_submit(admin: &str, path: &Path, store: &SupabaseStore) -> Result<i32> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission: {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Submission is not valid JSON: {}", path.display()))?;

    let stored = match form::submit_response(Some(admin), &raw, store, store).await {
        Ok(stored) => stored,
        Err(e) if form::is_store_outage(&e) => {
            eprintln!("\n⚠️  {:#}", e);
            return Ok(EXIT_STORE_UNAVAILABLE);
        }
        Err(e) => return Err(e),
    };

    println!(
        "🎉 Thank you! Response with {} answers submitted to {}.",
        stored.len(),
        admin
    );
    Ok(0)
}

fn exit_code_for(status: &StoreStatus) -> i32 {
    match status {
        StoreStatus::Available => 0,
        StoreStatus::Unavailable { reason } => {
            eprintln!("\n⚠️  Store unavailable: {}", reason);
            EXIT_STORE_UNAVAILABLE
        }
    }
}

/// Create the store client from configuration.
fn connect_store(config: &Config) -> Result<SupabaseStore> {
    let api_key = std::env::var(&config.store.api_key_env)
        .map_err(|_| StoreError::MissingApiKey(config.store.api_key_env.clone()))?;

    let store = SupabaseStore::new(StoreConfig {
        url: config.store.url.clone(),
        api_key,
        questions_table: config.store.questions_table.clone(),
        responses_table: config.store.responses_table.clone(),
        timeout_seconds: config.store.timeout_seconds,
    })?;

    Ok(store)
}

/// Create the sentiment classifier from configuration.
fn build_classifier(config: &Config) -> Result<InferenceClassifier> {
    let api_key = std::env::var(&config.classifier.api_key_env).ok();
    if api_key.is_none() {
        warn!(
            "{} not set; calling the inference endpoint without a token",
            config.classifier.api_key_env
        );
    }

    println!("🤖 Loading sentiment model...");
    println!("   Model: {}", config.classifier.model);
    println!("   Endpoint: {}", config.classifier.url);

    let classifier = InferenceClassifier::new(InferenceConfig {
        url: config.classifier.url.clone(),
        model: config.classifier.model.clone(),
        api_key,
        timeout_seconds: config.classifier.timeout_seconds,
    })
    .context("Failed to initialize sentiment classifier")?;

    Ok(classifier)
}

/// Load configuration from file or use defaults.
///
/// Runs before the tracing subscriber is installed, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}; using defaults", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
