//! Infrastructure layer for secreview
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod secrets;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAnthropicConfig, FileAzureOpenAiConfig, FileConfig, FileOpenAiConfig,
    FileProviderConfig, FileReviewConfig,
};
pub use logging::JsonlAuditLogger;
pub use providers::{
    AnthropicClient, AzureOpenAiClient, FactoryError, ModelFactory, OpenAiClient,
};
pub use secrets::GitleaksScanner;
