//! Prompt construction for audits and finding analysis

pub mod template;

pub use template::PromptTemplate;
