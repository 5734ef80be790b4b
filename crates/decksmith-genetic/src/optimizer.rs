//! The generation loop.

use std::{
    cmp::Ordering,
    collections::HashSet,
    panic,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
    thread,
    time::{Duration, Instant},
};

use decksmith_card::{CardPool, PoolError, SynergyLookup};
use rand::{Rng, SeedableRng, seq::IndexedRandom};
use rand_pcg::Pcg64;

use crate::{
    config::{GeneticConfig, InvalidGeneticConfig},
    fitness::{DeckFitness, FitnessCache},
    genome::{DeckGenome, SearchSpace},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GeneticError {
    #[display("insufficient candidates: {source}")]
    Pool { source: PoolError },
    #[display("{source}")]
    InvalidConfig { source: InvalidGeneticConfig },
    #[display("deck must have exactly 8 cards, got {actual}")]
    DeckSize { actual: usize },
    #[display("card {name:?} not found in candidates")]
    UnknownCard { name: String },
    #[display("card {name:?} appears more than once")]
    DuplicateCard { name: String },
    #[display("failed to resolve all cards: got {resolved}, want 8")]
    UnresolvedCards { resolved: usize },
}

impl From<PoolError> for GeneticError {
    fn from(source: PoolError) -> Self {
        Self::Pool { source }
    }
}

impl From<InvalidGeneticConfig> for GeneticError {
    fn from(source: InvalidGeneticConfig) -> Self {
        Self::InvalidConfig { source }
    }
}

/// Cooperative stop signal, honored at generation boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Snapshot reported after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProgress {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub islands: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StopReason {
    #[display("generation limit")]
    GenerationLimit,
    #[display("target fitness reached")]
    TargetReached,
    #[display("converged")]
    Converged,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct GeneticResult {
    /// Distinct decks, best first.
    pub hall_of_fame: Vec<DeckGenome>,
    pub generations_run: usize,
    pub stop_reason: StopReason,
    pub duration: Duration,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl GeneticResult {
    #[must_use]
    pub fn best(&self) -> Option<&DeckGenome> {
        self.hall_of_fame.first()
    }
}

type ProgressFn<'a> = Box<dyn FnMut(&GenerationProgress) + 'a>;

/// Genetic deck search over one candidate pool.
///
/// The fitness cache lives as long as the optimizer, so repeated runs of the
/// same optimizer share it but separate optimizers never do.
pub struct GeneticOptimizer<'a> {
    config: GeneticConfig,
    space: SearchSpace<'a>,
    fitness: &'a dyn DeckFitness,
    cache: FitnessCache,
    cancel: CancellationToken,
    progress: Option<ProgressFn<'a>>,
}

impl std::fmt::Debug for GeneticOptimizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneticOptimizer")
            .field("config", &self.config)
            .field("space", &self.space)
            .field("fitness", &self.fitness)
            .field("cache", &self.cache)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

fn by_fitness_desc(a: &DeckGenome, b: &DeckGenome) -> Ordering {
    b.rank().total_cmp(&a.rank())
}

fn tournament_select<'p, R>(population: &'p [DeckGenome], size: usize, rng: &mut R) -> Option<&'p DeckGenome>
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, size)
        .max_by(|a, b| a.rank().total_cmp(&b.rank()))
}

impl<'a> GeneticOptimizer<'a> {
    /// Validates the configuration and the pool up front.
    pub fn new(
        config: GeneticConfig,
        pool: &'a CardPool,
        synergy: &'a dyn SynergyLookup,
        fitness: &'a dyn DeckFitness,
    ) -> Result<Self, GeneticError> {
        config.validate()?;
        pool.ensure_deck_capacity()?;
        Ok(Self {
            config,
            space: SearchSpace::new(pool, synergy),
            fitness,
            cache: FitnessCache::new(),
            cancel: CancellationToken::new(),
            progress: None,
        })
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: FnMut(&GenerationProgress) + 'a,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    #[must_use]
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    /// Runs the search to completion.
    ///
    /// All randomness derives from `rng`; a fixed seed reproduces the run.
    pub fn run<R>(&mut self, rng: &mut R) -> Result<GeneticResult, GeneticError>
    where
        R: Rng + ?Sized,
    {
        let start = Instant::now();
        let (island_count, island_size) = self.config.island_layout();
        tracing::info!(
            population = self.config.population_size,
            generations = self.config.generations,
            islands = island_count,
            candidates = self.space.pool.len(),
            "starting genetic optimization"
        );

        let mut islands = (0..island_count)
            .map(|_| Island {
                rng: Pcg64::seed_from_u64(rng.random()),
                population: vec![],
            })
            .collect::<Vec<_>>();
        self.initialize(&mut islands, island_size)?;
        let breeder = Breeder {
            config: &self.config,
            space: self.space,
            fitness: self.fitness,
            cache: &self.cache,
        };
        for island in &mut islands {
            breeder.evaluate(&mut island.population)?;
        }

        let mut hall_of_fame = vec![];
        self.update_hall_of_fame(&mut hall_of_fame, &islands);
        let mut best_so_far = hall_of_fame.first().map_or(f64::NEG_INFINITY, DeckGenome::rank);
        let mut last_improvement = 0;
        let mut generation = 0;

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if generation >= self.config.generations {
                break StopReason::GenerationLimit;
            }

            breeder.step_islands(&mut islands)?;
            generation += 1;
            if self.config.island_model && generation % self.config.migration_interval == 0 {
                migrate(&mut islands, self.config.migration_size);
            }
            self.update_hall_of_fame(&mut hall_of_fame, &islands);

            let best = hall_of_fame.first().map_or(f64::NEG_INFINITY, DeckGenome::rank);
            let progress = GenerationProgress {
                generation,
                best_fitness: best,
                mean_fitness: mean_fitness(&islands),
                islands: islands.len(),
            };
            tracing::debug!(
                generation,
                best = progress.best_fitness,
                mean = progress.mean_fitness,
                "generation complete"
            );
            if let Some(callback) = &mut self.progress {
                callback(&progress);
            }

            if best > best_so_far {
                best_so_far = best;
                last_improvement = generation;
            }
            if self.config.target_fitness > 0.0 && best >= self.config.target_fitness {
                break StopReason::TargetReached;
            }
            if self.config.convergence_generations > 0
                && generation - last_improvement >= self.config.convergence_generations
            {
                break StopReason::Converged;
            }
        };

        let result = GeneticResult {
            hall_of_fame,
            generations_run: generation,
            stop_reason,
            duration: start.elapsed(),
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
        };
        tracing::info!(
            generations = result.generations_run,
            stop_reason = %result.stop_reason,
            best = result.best().and_then(DeckGenome::fitness),
            cache_hits = result.cache_hits,
            cache_misses = result.cache_misses,
            elapsed_ms = u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            "genetic optimization finished"
        );
        Ok(result)
    }

    fn initialize(&self, islands: &mut [Island], island_size: usize) -> Result<(), GeneticError> {
        let mut seeds = self.config.seed_population.iter().enumerate();
        for island in islands {
            for _ in 0..island_size {
                let seeded = seeds.next().and_then(|(index, cards)| {
                    DeckGenome::from_cards(cards, &self.space)
                        .inspect_err(|error| {
                            tracing::warn!(index, %error, "ignoring invalid seed deck");
                        })
                        .ok()
                });
                let genome = match seeded {
                    Some(genome) => genome,
                    None => DeckGenome::random(&self.space, &mut island.rng)?,
                };
                island.population.push(genome);
            }
        }
        Ok(())
    }

    /// Merges the current populations into the hall of fame.
    fn update_hall_of_fame(&self, hall_of_fame: &mut Vec<DeckGenome>, islands: &[Island]) {
        let mut keys = hall_of_fame.iter().map(DeckGenome::key).collect::<HashSet<_>>();
        for genome in islands.iter().flat_map(|i| &i.population) {
            if genome.fitness.is_some() && keys.insert(genome.key()) {
                hall_of_fame.push(genome.clone());
            }
        }
        hall_of_fame.sort_by(by_fitness_desc);
        hall_of_fame.truncate(self.config.hall_of_fame_size);
    }
}

/// The parts of the optimizer shared with worker threads.
#[derive(Clone, Copy)]
struct Breeder<'e> {
    config: &'e GeneticConfig,
    space: SearchSpace<'e>,
    fitness: &'e dyn DeckFitness,
    cache: &'e FitnessCache,
}

impl Breeder<'_> {
    /// Evaluates every unevaluated genome, sorting the population best first.
    fn evaluate(self, population: &mut [DeckGenome]) -> Result<(), GeneticError> {
        let Self {
            space,
            fitness,
            cache,
            ..
        } = self;
        if self.config.parallel_evaluations {
            let workers = thread::available_parallelism().map_or(1, usize::from);
            let chunk_size = population.len().div_ceil(workers).max(1);
            thread::scope(|s| {
                let handles = population
                    .chunks_mut(chunk_size)
                    .map(|chunk| {
                        s.spawn(move || {
                            chunk
                                .iter_mut()
                                .filter(|g| g.fitness.is_none())
                                .try_for_each(|g| g.evaluate(&space, fitness, cache).map(|_| ()))
                        })
                    })
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                    .collect::<Result<(), _>>()
            })?;
        } else {
            for genome in population.iter_mut().filter(|g| g.fitness.is_none()) {
                genome.evaluate(&space, fitness, cache)?;
            }
        }
        population.sort_by(by_fitness_desc);
        Ok(())
    }

    fn step_islands(self, islands: &mut [Island]) -> Result<(), GeneticError> {
        if self.config.parallel_evaluations && islands.len() > 1 {
            thread::scope(|s| {
                let handles = islands
                    .iter_mut()
                    .map(|island| s.spawn(move || self.step(island)))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                    .collect::<Result<(), _>>()
            })
        } else {
            islands.iter_mut().try_for_each(|island| self.step(island))
        }
    }

    /// Replaces an island's population with the next generation.
    fn step(self, island: &mut Island) -> Result<(), GeneticError> {
        let config = self.config;
        let population = &island.population;
        let rng = &mut island.rng;
        let size = population.len();
        let elite = config.elite_count.min(size);

        let mut next = population[..elite].to_vec();
        while next.len() < size {
            let (Some(p1), Some(p2)) = (
                tournament_select(population, config.tournament_size, rng),
                tournament_select(population, config.tournament_size, rng),
            ) else {
                break;
            };
            let children = if rng.random_bool(config.crossover_rate) {
                [
                    p1.crossover(p2, &self.space, rng),
                    p2.crossover(p1, &self.space, rng),
                ]
            } else {
                [p1.clone(), p2.clone()]
            };
            for mut child in children {
                if next.len() == size {
                    break;
                }
                if rng.random_bool(config.mutation_rate) {
                    child.mutate(config.mutation_intensity, &self.space, rng);
                }
                next.push(child);
            }
        }

        self.evaluate(&mut next)?;
        island.population = next;
        Ok(())
    }
}

#[derive(Debug)]
struct Island {
    rng: Pcg64,
    /// Sorted best first after every evaluation.
    population: Vec<DeckGenome>,
}

/// Ring migration: the best of island `i` replace the worst of island `i + 1`.
fn migrate(islands: &mut [Island], size: usize) {
    let emigrants = islands
        .iter()
        .map(|island| island.population.iter().take(size).cloned().collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let count = islands.len();
    for (from, migrants) in emigrants.into_iter().enumerate() {
        let target = &mut islands[(from + 1) % count].population;
        let keep = target.len().saturating_sub(migrants.len());
        target.truncate(keep);
        target.extend(migrants);
        target.sort_by(by_fitness_desc);
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean_fitness(islands: &[Island]) -> f64 {
    let (sum, count) = islands
        .iter()
        .flat_map(|i| &i.population)
        .filter_map(DeckGenome::fitness)
        .fold((0.0, 0_usize), |(sum, count), f| (sum + f, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
