use clap::{Parser, Subcommand};
use tracing::Level;

use crate::telemetry::{self, LogFormat};

use self::{benchmark::BenchmarkArg, build::BuildArg};

mod benchmark;
mod build;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Encoding of log lines written to stderr
    #[arg(long, global = true, value_enum, default_value_t)]
    log_format: LogFormat,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare deck-building strategies over a set of inputs
    Benchmark(#[clap(flatten)] BenchmarkArg),
    /// Build one deck with a single strategy
    Build(#[clap(flatten)] BuildArg),
}

/// Options shared by every subcommand that builds decks.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArg {
    /// Base random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of ranked results the search strategies aim for
    #[arg(long = "top", default_value_t = 1)]
    top_n: usize,
    /// JSON synergy table (`{"pairs": [...]}`)
    #[arg(long)]
    synergy: Option<std::path::PathBuf>,
    /// JSON constraint configuration
    #[arg(long)]
    constraints: Option<std::path::PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    telemetry::init_logging(args.log_format, Level::INFO);
    match args.mode {
        Mode::Benchmark(arg) => benchmark::run(&arg)?,
        Mode::Build(arg) => build::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use decksmith_research::StrategyKind;

    use super::*;

    #[test]
    fn test_benchmark_defaults() {
        let args = CommandArgs::try_parse_from(["decksmith", "benchmark", "a.json", "b.json"]).unwrap();
        let Mode::Benchmark(arg) = args.mode else {
            panic!("expected benchmark");
        };
        assert_eq!(arg.methods, StrategyKind::ALL);
        assert_eq!(arg.search.seed, 42);
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn test_methods_are_comma_separated() {
        let args = CommandArgs::try_parse_from([
            "decksmith",
            "benchmark",
            "a.json",
            "--methods",
            "genetic,role-first",
            "--log-format",
            "json",
        ])
        .unwrap();
        let Mode::Benchmark(arg) = args.mode else {
            panic!("expected benchmark");
        };
        assert_eq!(arg.methods, [StrategyKind::Genetic, StrategyKind::RoleFirst]);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(
            CommandArgs::try_parse_from(["decksmith", "build", "a.json", "--method", "random"]).is_err()
        );
        assert!(CommandArgs::try_parse_from(["decksmith", "benchmark"]).is_err());
    }
}
