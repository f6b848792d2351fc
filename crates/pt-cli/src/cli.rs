//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::paid::PaidArgs;
use crate::commands::report::ReportArgs;
use crate::commands::util::AgentWindowArgs;

/// Paid-time calculator.
///
/// Resolves overlapping, priority-ranked schedule events into the time an
/// agent is actually paid for.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import events from JSONL on stdin.
    Import,

    /// Show paid time for one agent.
    Paid(PaidArgs),

    /// Print one agent's flattened segments as JSONL.
    Segments(AgentWindowArgs),

    /// Show paid time for every agent.
    Report(ReportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paid_parses_agent_and_window() {
        let cli = Cli::try_parse_from([
            "pt",
            "paid",
            "--agent",
            "7",
            "--start",
            "2022-07-06T00:00:00Z",
            "--end",
            "2022-07-07T00:00:00Z",
            "--json",
        ])
        .unwrap();

        let Some(Commands::Paid(args)) = cli.command else {
            panic!("expected paid command");
        };
        assert_eq!(args.target.agent, pt_core::AgentId::new(7));
        assert!(args.json);
    }

    #[test]
    fn paid_rejects_non_numeric_agent() {
        let result = Cli::try_parse_from([
            "pt", "paid", "--agent", "bob", "--start", "1 day ago", "--end", "1 hour ago",
        ]);
        assert!(result.is_err());
    }
}
