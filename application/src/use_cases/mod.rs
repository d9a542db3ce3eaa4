//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod filter_findings;
pub mod mask_secrets;
pub mod review_pull_request;
pub mod run_security_audit;

#[cfg(test)]
pub(crate) mod testing;
