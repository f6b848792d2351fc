//! CLI subcommand implementations.

pub mod import;
pub mod paid;
pub mod report;
pub mod segments;
pub mod util;
