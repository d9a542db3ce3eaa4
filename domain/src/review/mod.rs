//! Security review subdomain.
//!
//! - [`finding`]: findings, severities and the report
//! - [`verdict`]: per-finding false-positive judgement
//! - [`pull_request`]: PR metadata fed into prompts
//! - [`parsing`]: JSON extraction from model replies

pub mod finding;
pub mod parsing;
pub mod pull_request;
pub mod verdict;
