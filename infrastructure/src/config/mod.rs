//! Configuration file loading for secreview
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables (`AI_PROVIDER`, `AI_MODEL`, `AZURE_OPENAI_ENDPOINT`, ...)
//! 2. `--config <path>` specified file
//! 3. Project root: `./secreview.toml` or `./.secreview.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/secreview/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileAzureOpenAiConfig, FileConfig, FileOpenAiConfig, FileProviderConfig,
    FileReviewConfig,
};
pub use loader::ConfigLoader;
