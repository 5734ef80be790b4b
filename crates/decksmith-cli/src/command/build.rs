use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use decksmith_card::CardPool;
use decksmith_research::{BuildContext, LevelFirstBuilder, StrategyKind, strategy_for};

use crate::{
    command::SearchArg,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BuildArg {
    /// Benchmark input file holding the candidate pool
    input: PathBuf,
    /// Strategy to run
    #[arg(long)]
    method: StrategyKind,
    /// Output file path (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    search: SearchArg,
}

pub(crate) fn run(arg: &BuildArg) -> anyhow::Result<()> {
    let BuildArg {
        input,
        method,
        output,
        search,
    } = arg;

    let input = util::read_input_file(input)?;
    let pool = CardPool::new(input.candidates)
        .with_context(|| format!("Invalid candidate pool for {}", input.tag))?;
    let ctx = BuildContext {
        top_n: search.top_n,
        constraints: util::load_constraints(search.constraints.as_deref())?,
        synergy: util::load_synergy(search.synergy.as_deref())?,
        genetic: util::load_genetic_config()?,
        ..BuildContext::new(search.seed)
    };

    let strategy = strategy_for(*method, Some(Arc::new(LevelFirstBuilder)));
    let result = strategy
        .build(&pool, &ctx)
        .with_context(|| format!("Strategy {method} failed for {}", input.tag))?;
    tracing::info!(
        tag = %input.tag,
        composite = result.metrics.composite,
        runtime_ms = result.metrics.runtime_ms,
        "deck built"
    );

    Output::save_json(&result, output.clone())?;
    Ok(())
}
