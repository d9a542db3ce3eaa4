//! Secret scanners
//!
//! Adapters for the [`SecretScanner`](secreview_application::SecretScanner)
//! port.

mod gitleaks;

pub use gitleaks::GitleaksScanner;
