use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use decksmith_card::SynergyTable;
use decksmith_evaluator::ConstraintConfig;
use decksmith_genetic::GeneticConfig;
use decksmith_research::BenchmarkInput;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

pub fn read_input_file<P>(path: P) -> anyhow::Result<BenchmarkInput>
where
    P: AsRef<Path>,
{
    read_json_file("benchmark input", path)
}

/// Reads the synergy table, or an empty table when no path is given.
pub fn load_synergy(path: Option<&Path>) -> anyhow::Result<Arc<SynergyTable>> {
    let table = match path {
        Some(path) => read_json_file("synergy", path)?,
        None => SynergyTable::default(),
    };
    Ok(Arc::new(table))
}

/// Reads the constraint configuration, or the defaults when no path is given.
pub fn load_constraints(path: Option<&Path>) -> anyhow::Result<ConstraintConfig> {
    let config: ConstraintConfig = match path {
        Some(path) => read_json_file("constraint config", path)?,
        None => ConstraintConfig::default(),
    };
    config
        .validate()
        .context("Invalid constraint configuration")?;
    Ok(config)
}

/// Benchmark preset with `GA_*` environment overrides applied.
pub fn load_genetic_config() -> anyhow::Result<GeneticConfig> {
    let mut config = GeneticConfig::benchmark_preset();
    config
        .apply_env_overrides()
        .context("Invalid GA_* environment override")?;
    config
        .validate()
        .context("Invalid genetic configuration")?;
    Ok(config)
}
