//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when stdout is a terminal
    Text,
    /// Pretty-printed JSON
    Json,
}

/// CLI arguments for secreview
#[derive(Parser, Debug)]
#[command(name = "secreview")]
#[command(author, version, about = "AI-assisted security review of code changes")]
#[command(long_about = r#"
secreview asks an AI model to audit a repository or pull request for
security vulnerabilities, then optionally asks it again to weed out
false positives.

Supported providers: anthropic, openai, azure_openai

Configuration files are loaded from (in priority order):
1. --config <path>                    Explicit config file
2. ./secreview.toml or ./.secreview.toml   Project-level config
3. ~/.config/secreview/config.toml    Global config
Environment variables (AI_PROVIDER, AI_MODEL, ...) override files,
and --provider / --model override everything.

Example:
  secreview audit --repo . --pr pr.json --diff pr.diff
  secreview --provider azure_openai --model my-gpt4o validate
  secreview mask --diff pr.diff
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// AI provider (anthropic, openai, azure_openai)
    #[arg(long, global = true, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model name, or deployment name for Azure OpenAI
    #[arg(short, long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append a JSONL transcript of API calls to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a security audit against a repository
    Audit(AuditArgs),

    /// Check that the configured provider accepts our credentials
    Validate,

    /// Re-check the findings of an existing report for false positives
    Filter(FilterArgs),

    /// Print a diff with detected secrets redacted
    Mask(MaskArgs),

    /// List supported providers and their defaults
    Providers,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Repository checkout the model may inspect
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Send this prompt verbatim instead of building one from a pull request
    #[arg(long, value_name = "FILE", conflicts_with_all = ["pr", "diff"])]
    pub prompt_file: Option<PathBuf>,

    /// Pull request metadata as returned by the GitHub REST API
    #[arg(long, value_name = "FILE", required_unless_present = "prompt_file")]
    pub pr: Option<PathBuf>,

    /// Unified diff of the pull request
    #[arg(long, value_name = "FILE", requires = "pr")]
    pub diff: Option<PathBuf>,

    /// Skip the false-positive filtering pass
    #[arg(long)]
    pub no_filter: bool,

    /// Do not redact secrets from the diff before sending it
    #[arg(long)]
    pub no_mask: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Report JSON with a `findings` array
    #[arg(long, value_name = "FILE")]
    pub findings: PathBuf,

    /// Pull request metadata used as context for each finding
    #[arg(long, value_name = "FILE")]
    pub pr: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Unified diff to redact
    #[arg(long, value_name = "FILE")]
    pub diff: PathBuf,
}
