//! Genetic optimizer tunables.
//!
//! All parameters have documented defaults ([`GeneticConfig::default`]) and
//! can be overridden independently, either in code or through `GA_*`
//! environment variables ([`GeneticConfig::apply_overrides`]). A config is
//! validated as a whole before any generation runs; every offending field is
//! reported.

use std::fmt;

/// Parameters of one genetic optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticConfig {
    /// Number of individuals (split evenly across islands in island mode).
    pub population_size: usize,
    /// Upper bound on the number of generations.
    pub generations: usize,
    /// Probability that an offspring is mutated.
    pub mutation_rate: f64,
    /// Probability that a selected parent pair is recombined.
    pub crossover_rate: f64,
    /// Share of the deck replaced by one mutation.
    pub mutation_intensity: f64,
    /// Top individuals copied unchanged into the next generation.
    pub elite_count: usize,
    pub tournament_size: usize,
    /// Evaluate fitness and step islands on scoped worker threads.
    pub parallel_evaluations: bool,
    /// Stop after this many generations without improvement (0 disables).
    pub convergence_generations: usize,
    /// Stop once the best fitness reaches this value (0 disables).
    pub target_fitness: f64,
    pub island_model: bool,
    pub island_count: usize,
    /// Generations between ring migrations.
    pub migration_interval: usize,
    /// Individuals sent from each island to its neighbor per migration.
    pub migration_size: usize,
    /// Number of distinct best decks kept in the result.
    pub hall_of_fame_size: usize,
    /// Decks used for the first genomes instead of random ones.
    pub seed_population: Vec<Vec<String>>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 200,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            mutation_intensity: 0.3,
            elite_count: 2,
            tournament_size: 5,
            parallel_evaluations: true,
            convergence_generations: 30,
            target_fitness: 0.0,
            island_model: false,
            island_count: 4,
            migration_interval: 15,
            migration_size: 2,
            hall_of_fame_size: 10,
            seed_population: vec![],
        }
    }
}

/// One invalid parameter.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GeneticConfigError {
    #[display("{field} must be positive")]
    NotPositive { field: &'static str },
    #[display("{field} must be between 0 and 1, got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[display("elite_count ({elite_count}) must be less than population_size ({population_size})")]
    EliteCountTooLarge {
        elite_count: usize,
        population_size: usize,
    },
    #[display("tournament_size ({tournament_size}) must not exceed population_size ({population_size})")]
    TournamentSizeTooLarge {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("target_fitness must be a non-negative number, got {value}")]
    NegativeTargetFitness { value: f64 },
    #[display("island_count must be at least 2 when island_model is enabled, got {island_count}")]
    TooFewIslands { island_count: usize },
    #[display("{field} must be positive when island_model is enabled")]
    IslandParameterNotPositive { field: &'static str },
    #[display("elite_count ({elite_count}) must be less than per-island population ({per_island})")]
    EliteCountExceedsIsland {
        elite_count: usize,
        per_island: usize,
    },
    #[display("migration_size ({migration_size}) must be less than per-island population ({per_island})")]
    MigrationSizeTooLarge {
        migration_size: usize,
        per_island: usize,
    },
    #[display("invalid value for {variable}: {value:?}")]
    InvalidOverride { variable: &'static str, value: String },
}

/// Every parameter that failed validation.
#[derive(Debug, Clone, PartialEq, derive_more::Error)]
pub struct InvalidGeneticConfig {
    pub errors: Vec<GeneticConfigError>,
}

impl fmt::Display for InvalidGeneticConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid genetic config: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn override_with<T, F>(
    lookup: &F,
    variable: &'static str,
    target: &mut T,
    parse: fn(&str) -> Option<T>,
) -> Result<(), GeneticConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(variable) else {
        return Ok(());
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(());
    }
    *target = parse(value).ok_or_else(|| GeneticConfigError::InvalidOverride {
        variable,
        value: raw.clone(),
    })?;
    Ok(())
}

impl GeneticConfig {
    /// Smaller, faster settings used when comparing strategies.
    #[must_use]
    pub fn benchmark_preset() -> Self {
        Self {
            population_size: 60,
            generations: 80,
            convergence_generations: 20,
            elite_count: 2,
            ..Self::default()
        }
    }

    /// Number of islands and individuals per island.
    #[must_use]
    pub fn island_layout(&self) -> (usize, usize) {
        if self.island_model && self.island_count > 0 {
            (self.island_count, (self.population_size / self.island_count).max(1))
        } else {
            (1, self.population_size)
        }
    }

    /// Applies `GA_*` overrides read through `lookup`.
    ///
    /// Unset or blank variables leave the field untouched. A value that does
    /// not parse is an error naming the variable; range checks are left to
    /// [`validate`](Self::validate).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GeneticConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let usize_value: fn(&str) -> Option<usize> = |s| s.parse().ok();
        let f64_value: fn(&str) -> Option<f64> = |s| s.parse().ok();
        let l = &lookup;
        override_with(l, "GA_POPULATION_SIZE", &mut self.population_size, usize_value)?;
        override_with(l, "GA_GENERATIONS", &mut self.generations, usize_value)?;
        override_with(l, "GA_MUTATION_RATE", &mut self.mutation_rate, f64_value)?;
        override_with(l, "GA_CROSSOVER_RATE", &mut self.crossover_rate, f64_value)?;
        override_with(l, "GA_MUTATION_INTENSITY", &mut self.mutation_intensity, f64_value)?;
        override_with(l, "GA_ELITE_COUNT", &mut self.elite_count, usize_value)?;
        override_with(l, "GA_TOURNAMENT_SIZE", &mut self.tournament_size, usize_value)?;
        override_with(l, "GA_PARALLEL_EVALUATIONS", &mut self.parallel_evaluations, parse_bool)?;
        override_with(
            l,
            "GA_CONVERGENCE_GENERATIONS",
            &mut self.convergence_generations,
            usize_value,
        )?;
        override_with(l, "GA_TARGET_FITNESS", &mut self.target_fitness, f64_value)?;
        override_with(l, "GA_ISLAND_MODEL", &mut self.island_model, parse_bool)?;
        override_with(l, "GA_ISLAND_COUNT", &mut self.island_count, usize_value)?;
        override_with(l, "GA_MIGRATION_INTERVAL", &mut self.migration_interval, usize_value)?;
        override_with(l, "GA_MIGRATION_SIZE", &mut self.migration_size, usize_value)?;
        Ok(())
    }

    /// [`apply_overrides`](Self::apply_overrides) against the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), GeneticConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), InvalidGeneticConfig> {
        use GeneticConfigError as E;

        let mut errors = vec![];
        for (field, value) in [
            ("population_size", self.population_size),
            ("generations", self.generations),
            ("tournament_size", self.tournament_size),
            ("hall_of_fame_size", self.hall_of_fame_size),
        ] {
            if value == 0 {
                errors.push(E::NotPositive { field });
            }
        }
        for (field, value) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("mutation_intensity", self.mutation_intensity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(E::OutOfUnitRange { field, value });
            }
        }
        if self.population_size > 0 && self.elite_count >= self.population_size {
            errors.push(E::EliteCountTooLarge {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.population_size > 0 && self.tournament_size > self.population_size {
            errors.push(E::TournamentSizeTooLarge {
                tournament_size: self.tournament_size,
                population_size: self.population_size,
            });
        }
        if self.target_fitness.is_nan() || self.target_fitness < 0.0 {
            errors.push(E::NegativeTargetFitness {
                value: self.target_fitness,
            });
        }
        if self.island_model {
            if self.island_count < 2 {
                errors.push(E::TooFewIslands {
                    island_count: self.island_count,
                });
            }
            for (field, value) in [
                ("migration_interval", self.migration_interval),
                ("migration_size", self.migration_size),
            ] {
                if value == 0 {
                    errors.push(E::IslandParameterNotPositive { field });
                }
            }
            if self.island_count >= 2 {
                let per_island = self.population_size / self.island_count;
                if self.elite_count >= per_island && self.elite_count < self.population_size {
                    errors.push(E::EliteCountExceedsIsland {
                        elite_count: self.elite_count,
                        per_island,
                    });
                }
                if self.migration_size > 0 && self.migration_size >= per_island {
                    errors.push(E::MigrationSizeTooLarge {
                        migration_size: self.migration_size,
                        per_island,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(InvalidGeneticConfig { errors })
        }
    }
}
