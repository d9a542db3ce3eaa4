//! CLI entrypoint for secreview
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use secreview_application::{
    AiModelClient, AuditLogger, ClientError, FilterFindingsUseCase, MaskSecretsUseCase, NoAuditLog,
    NoProgress, ReviewProgressNotifier, ReviewPullRequestInput, ReviewPullRequestUseCase,
    RunAuditError, RunSecurityAuditUseCase,
};
use secreview_domain::{ModelProvider, PullRequest, SecurityReport};
use secreview_infrastructure::{
    ConfigLoader, FileConfig, GitleaksScanner, JsonlAuditLogger, ModelFactory,
};
use secreview_presentation::{
    AuditArgs, Cli, Command, ConsoleFormatter, FilterArgs, MaskArgs, OutputFormat,
    ProgressReporter,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = hint_for(&e) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, or to `--log-file` through a background writer.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        let config = load_config(&cli)?;
        println!();
        println!("Effective settings:");
        for (key, value) in config.effective_settings() {
            println!("  {:<18} {}", key, value);
        }
        return Ok(());
    }

    info!("Starting secreview");

    let config = load_config(&cli)?;

    let Some(command) = cli.command.as_ref() else {
        bail!("No command given. Run `secreview --help` for usage.");
    };

    if matches!(command, Command::Providers) {
        let current = config.provider.name.parse::<ModelProvider>().ok();
        print!("{}", ConsoleFormatter::format_providers(current));
        return Ok(());
    }

    // Masking needs no model client
    if let Command::Mask(args) = command {
        return run_mask(args).await;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("{}", ConsoleFormatter::format_config_issues(&issues));
    }
    if FileConfig::has_errors(&issues) {
        bail!("Invalid configuration");
    }

    // === Dependency Injection ===
    let factory = ModelFactory::from_config(&config);
    let client = factory
        .create_configured_client()
        .context("Failed to create AI client")?;
    let audit_log = open_audit_log(&cli)?;

    let progress: Box<dyn ReviewProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    match command {
        Command::Validate => run_validate(client, &config).await,
        Command::Audit(args) => {
            run_audit(args, client, audit_log, &config, progress.as_ref()).await
        }
        Command::Filter(args) => {
            run_filter(args, client, audit_log, &config, progress.as_ref()).await
        }
        Command::Mask(_) | Command::Providers => Ok(()),
    }
}

/// Load configuration and apply `--provider` / `--model` on top.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("Config file not found: {}", path.display());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_without_files()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .context("Failed to load configuration")?;

    if let Some(provider) = &cli.provider {
        // A model configured for another provider must not leak across
        if !provider.eq_ignore_ascii_case(&config.provider.name) && cli.model.is_none() {
            config.provider.model = None;
        }
        config.provider.name = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = Some(model.clone());
    }

    Ok(config)
}

fn open_audit_log(cli: &Cli) -> Result<Arc<dyn AuditLogger>> {
    match &cli.audit_log {
        Some(path) => {
            let logger = JsonlAuditLogger::open(path)
                .with_context(|| format!("Failed to open audit log {}", path.display()))?;
            info!(path = %path.display(), "Writing API audit log");
            Ok(Arc::new(logger))
        }
        None => Ok(Arc::new(NoAuditLog)),
    }
}

async fn run_validate(client: Arc<dyn AiModelClient>, config: &FileConfig) -> Result<()> {
    let provider = client.provider();
    let model = client.model().clone();
    RunSecurityAuditUseCase::new(client)
        .with_config(config.review.to_review_config())
        .validate_ai_available()
        .await?;
    println!(
        "{} API access OK (model: {})",
        provider.display_name(),
        model
    );
    Ok(())
}

async fn run_audit(
    args: &AuditArgs,
    client: Arc<dyn AiModelClient>,
    audit_log: Arc<dyn AuditLogger>,
    config: &FileConfig,
    progress: &dyn ReviewProgressNotifier,
) -> Result<()> {
    let review_config = config.review.to_review_config();
    let audit = RunSecurityAuditUseCase::new(client.clone())
        .with_config(review_config.clone())
        .with_audit_logger(audit_log.clone());

    let filter = (!args.no_filter && config.review.filter_findings).then(|| {
        FilterFindingsUseCase::new(client)
            .with_config(review_config)
            .with_custom_instructions(config.review.custom_filtering_instructions.clone())
            .with_audit_logger(audit_log)
    });

    if let Some(prompt_file) = &args.prompt_file {
        let prompt = read_text(prompt_file, "prompt")?;
        let report = audit
            .execute_with_progress(&args.repo, &prompt, progress)
            .await?;

        match filter {
            Some(filter) if report.has_findings() => {
                let outcome = filter.execute_with_progress(report, None, progress).await;
                print_output(
                    args.output,
                    ConsoleFormatter::format_filter_outcome(&outcome),
                    ConsoleFormatter::format_filter_json(&outcome),
                );
            }
            _ => print_report(args.output, &report),
        }
        return Ok(());
    }

    let Some(pr_path) = &args.pr else {
        bail!("Either --prompt-file or --pr is required");
    };
    let pull_request = read_pull_request(pr_path)?;
    let diff = args
        .diff
        .as_deref()
        .map(|path| read_text(path, "diff"))
        .transpose()?;

    let mut use_case = ReviewPullRequestUseCase::new(audit);
    if !args.no_mask && config.review.mask_secrets {
        use_case = use_case.with_masking(MaskSecretsUseCase::new(Arc::new(GitleaksScanner::new())));
    }
    if let Some(filter) = filter {
        use_case = use_case.with_filter(filter);
    }

    let input = ReviewPullRequestInput {
        repo_dir: args.repo.clone(),
        pull_request,
        diff,
        custom_scan_instructions: config.review.custom_scan_instructions.clone(),
    };
    let output = use_case.execute_with_progress(input, progress).await?;

    print_output(
        args.output,
        ConsoleFormatter::format_review(&output),
        ConsoleFormatter::format_review_json(&output),
    );
    Ok(())
}

async fn run_filter(
    args: &FilterArgs,
    client: Arc<dyn AiModelClient>,
    audit_log: Arc<dyn AuditLogger>,
    config: &FileConfig,
    progress: &dyn ReviewProgressNotifier,
) -> Result<()> {
    let content = read_text(&args.findings, "findings report")?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid findings report {}", args.findings.display()))?;
    let decoded = SecurityReport::decode_model_output(&value);
    for rejected in &decoded.rejected {
        warn!(index = rejected.index, reason = %rejected.reason, "Skipping unreadable finding");
    }
    let mut report = decoded.report;
    report.recount();

    let pr_context = args
        .pr
        .as_deref()
        .map(read_pull_request)
        .transpose()?
        .map(|pr| pr.context());

    let outcome = FilterFindingsUseCase::new(client)
        .with_config(config.review.to_review_config())
        .with_custom_instructions(config.review.custom_filtering_instructions.clone())
        .with_audit_logger(audit_log)
        .execute_with_progress(report, pr_context.as_ref(), progress)
        .await;

    if outcome.analysis_failures > 0 {
        warn!(
            failures = outcome.analysis_failures,
            "Some findings could not be analyzed and were kept"
        );
    }

    print_output(
        args.output,
        ConsoleFormatter::format_filter_outcome(&outcome),
        ConsoleFormatter::format_filter_json(&outcome),
    );
    Ok(())
}

async fn run_mask(args: &MaskArgs) -> Result<()> {
    let diff = read_text(&args.diff, "diff")?;
    let result = MaskSecretsUseCase::new(Arc::new(GitleaksScanner::new()))
        .execute(&diff)
        .await;
    info!(status = ?result.status, "Masking finished");
    print!("{}", result.content);
    Ok(())
}

fn print_report(format: OutputFormat, report: &SecurityReport) {
    print_output(
        format,
        ConsoleFormatter::format_report(report),
        ConsoleFormatter::format_report_json(report),
    );
}

fn print_output(format: OutputFormat, text: String, json: String) {
    match format {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => println!("{}", json),
    }
}

fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file {}", what, path.display()))
}

fn read_pull_request(path: &Path) -> Result<PullRequest> {
    let content = read_text(path, "pull request")?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    PullRequest::from_github_json(&value)
        .with_context(|| format!("Unexpected pull request format in {}", path.display()))
}

/// Operator guidance attached to provider failures
fn hint_for(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        if let Some(RunAuditError::Client(e) | RunAuditError::Validation(e)) =
            cause.downcast_ref::<RunAuditError>()
        {
            return e.hint();
        }
        cause.downcast_ref::<ClientError>().and_then(ClientError::hint)
    })
}
