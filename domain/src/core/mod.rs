//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ModelProvider`]: supported AI providers
//! - [`model::Model`]: model identifiers (Claude, GPT, custom deployments)
//! - [`error::DomainError`]: domain-level errors
//! - [`validation::ConfigIssue`]: structured configuration problems

pub mod error;
pub mod model;
pub mod provider;
pub mod validation;
