//! AI provider clients
//!
//! One [`AiModelClient`](secreview_application::AiModelClient) per provider,
//! plus the [`ModelFactory`](factory::ModelFactory) that picks between them.

pub mod anthropic;
pub mod azure_openai;
pub mod factory;
mod http;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use azure_openai::AzureOpenAiClient;
pub use factory::{ClientConstructor, EnvLookup, FactoryError, ModelFactory};
pub use openai::OpenAiClient;
