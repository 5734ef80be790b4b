use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Context;
use decksmith_research::{
    BenchmarkConfig, BenchmarkRunner, LevelFirstBuilder, StrategyKind, render_markdown,
};

use crate::{
    command::SearchArg,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BenchmarkArg {
    /// Benchmark input files, one per player
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory receiving `benchmark.json` and `benchmark.md`
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Strategies to compare
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "baseline,genetic,constraint,role-first"
    )]
    pub(super) methods: Vec<StrategyKind>,
    #[clap(flatten)]
    pub(super) search: SearchArg,
}

pub(crate) fn run(arg: &BenchmarkArg) -> anyhow::Result<()> {
    let BenchmarkArg {
        inputs,
        output_dir,
        methods,
        search,
    } = arg;

    let inputs = inputs
        .iter()
        .map(util::read_input_file)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let config = BenchmarkConfig {
        seed: search.seed,
        top_n: search.top_n,
        strategies: methods.clone(),
        constraints: util::load_constraints(search.constraints.as_deref())?,
        genetic: util::load_genetic_config()?,
    };
    let runner = BenchmarkRunner::new()
        .with_synergy(util::load_synergy(search.synergy.as_deref())?)
        .with_baseline(Arc::new(LevelFirstBuilder));

    let report = runner.run(&config, &inputs)?;

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;
    let json_path = output_dir.join("benchmark.json");
    Output::open(json_path.clone())?.write_json(&report)?;
    let md_path = output_dir.join("benchmark.md");
    let markdown = render_markdown(&report).context("Failed to render benchmark report")?;
    fs::write(&md_path, markdown)
        .with_context(|| format!("Failed to write report: {}", md_path.display()))?;

    println!("{}", json_path.display());
    println!("{}", md_path.display());
    Ok(())
}
