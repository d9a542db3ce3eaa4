//! Output formatting for reports

pub mod console;
