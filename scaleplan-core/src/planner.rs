//! Planning pipeline and plan rendering.
//!
//! [`Planner::plan`] pushes every enumerated tuple through filtering, scaling,
//! command building and path encoding, and only returns once the whole plan
//! exists. A fatal error therefore never leaves a partial plan behind.
//! [`Plan::write_lines`] renders the plan for a line-oriented dispatcher.

use std::{
    collections::{BTreeMap, HashSet},
    io,
    sync::Arc,
};

use tracing::{debug, info, instrument, warn};

use crate::{
    command::{Command, CommandBuilder},
    error::PlanError,
    filter::CombinationFilter,
    log_path::{LogPath, LogPathEncoder, exponent_token},
    scaling::{ScalingPolicy, SeedMixer, SeedPolicy},
    space::{ParameterSpace, ParameterTuple},
};

/// Timing wrapper prefixed to every command when no override is configured.
pub const DEFAULT_TIMING_WRAPPER: &str = "/usr/bin/time -av";

/// Whether excluded combinations leave a trace in the logs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FilterReporting {
    /// Drop invalid combinations without any diagnostic.
    #[default]
    Silent,
    /// Emit a `debug` event for every dropped combination.
    Log,
}

/// One experiment: the tuple that is run, its command and its log file.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedRun {
    /// Tuple after scaling.
    pub tuple: ParameterTuple,
    /// Invocation of the benchmark executable.
    pub command: Command,
    /// Destination of the run's combined output.
    pub log_path: LogPath,
}

/// Counters collected during one planning pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlanStats {
    /// Combinations produced by the parameter space.
    pub enumerated: usize,
    /// Combinations dropped by the filter.
    pub rejected: usize,
    /// Runs in the plan.
    pub emitted: usize,
}

/// A complete, validated plan.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    runs: Vec<PlannedRun>,
    stats: PlanStats,
    timing_wrapper: String,
}

impl Plan {
    /// Planned runs in enumeration order.
    #[must_use]
    pub fn runs(&self) -> &[PlannedRun] {
        &self.runs
    }

    /// Counters collected while planning.
    #[must_use]
    pub const fn stats(&self) -> PlanStats {
        self.stats
    }

    /// Iterates over the rendered dispatcher lines, without trailing newlines.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.runs.iter().map(|run| {
            if self.timing_wrapper.is_empty() {
                format!("{} > {} 2>&1", run.command, run.log_path)
            } else {
                format!("{} {} > {} 2>&1", self.timing_wrapper, run.command, run.log_path)
            }
        })
    }

    /// Writes one dispatcher line per run.
    ///
    /// # Errors
    /// Returns [`io::Error`] if writing to `writer` fails.
    ///
    /// # Examples
    /// ```
    /// use scaleplan_core::{ParameterSpace, Planner};
    ///
    /// let space = ParameterSpace::builder()
    ///     .seeds([7])
    ///     .node_counts([100])
    ///     .degrees([2])
    ///     .exponents([1.0])
    ///     .algorithms(["dyn"])
    ///     .build()
    ///     .expect("axes are valid");
    /// let plan = Planner::new(space)
    ///     .with_timing_wrapper("")
    ///     .plan()
    ///     .expect("known algorithm");
    /// let mut out = Vec::new();
    /// plan.write_lines(&mut out).expect("writing to memory succeeds");
    /// let text = String::from_utf8(out).expect("utf-8");
    /// assert_eq!(text.lines().count(), 1);
    /// assert!(text.ends_with(" 2>&1\n"));
    /// ```
    pub fn write_lines(&self, mut writer: impl io::Write) -> io::Result<()> {
        for line in self.lines() {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    /// Sorted, de-duplicated directories the log files are written to.
    #[must_use]
    pub fn log_directories(&self) -> Vec<&str> {
        let mut directories: Vec<&str> = self
            .runs
            .iter()
            .map(|run| run.log_path.directory())
            .collect();
        directories.sort_unstable();
        directories.dedup();
        directories
    }
}

/// Composes the planning pipeline for one parameter space.
///
/// # Examples
/// ```
/// use scaleplan_core::{ParameterSpace, Planner, ScalingMode};
///
/// let space = ParameterSpace::builder()
///     .seeds([42])
///     .node_counts([1_000])
///     .scaling_modes([ScalingMode::Strong])
///     .degrees([2])
///     .exponents([1.0])
///     .algorithms(["par-polypa"])
///     .threads([1, 2])
///     .build()
///     .expect("axes are valid");
/// let plan = Planner::new(space).plan().expect("known algorithm");
/// assert_eq!(plan.runs().len(), 2);
/// assert!(plan.runs().iter().all(|run| run.tuple.node_count == 1_000));
/// ```
#[derive(Clone, Debug)]
pub struct Planner<M = SeedPolicy> {
    spaces: Vec<ParameterSpace>,
    scaling: ScalingPolicy<M>,
    filter: CombinationFilter,
    commands: CommandBuilder,
    paths: LogPathEncoder,
    timing_wrapper: String,
    reporting: FilterReporting,
}

impl Planner {
    /// Creates a planner with default executable, log root, timing wrapper
    /// and [`SeedPolicy::SplitMix`] seeds.
    #[must_use]
    pub fn new(space: ParameterSpace) -> Self {
        Self::from_spaces([space])
    }

    /// Creates a planner whose plan concatenates several spaces in order.
    ///
    /// Used for studies that are a union of grids, such as a variant that
    /// only exists for some algorithms.
    #[must_use]
    pub fn from_spaces(spaces: impl IntoIterator<Item = ParameterSpace>) -> Self {
        Self {
            spaces: spaces.into_iter().collect(),
            scaling: ScalingPolicy::default(),
            filter: CombinationFilter,
            commands: CommandBuilder::default(),
            paths: LogPathEncoder::default(),
            timing_wrapper: DEFAULT_TIMING_WRAPPER.to_owned(),
            reporting: FilterReporting::default(),
        }
    }
}

impl<M: SeedMixer> Planner<M> {
    /// Replaces the seed mixer.
    #[must_use]
    pub fn with_seed_mixer<N: SeedMixer>(self, mixer: N) -> Planner<N> {
        Planner {
            spaces: self.spaces,
            scaling: ScalingPolicy::new(mixer),
            filter: self.filter,
            commands: self.commands,
            paths: self.paths,
            timing_wrapper: self.timing_wrapper,
            reporting: self.reporting,
        }
    }

    /// Overrides the benchmark executable.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.commands = CommandBuilder::new(executable);
        self
    }

    /// Overrides the log root directory.
    #[must_use]
    pub fn with_log_root(mut self, root: impl Into<String>) -> Self {
        self.paths = LogPathEncoder::new(root);
        self
    }

    /// Overrides the timing wrapper. An empty wrapper emits bare commands.
    #[must_use]
    pub fn with_timing_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.timing_wrapper = wrapper.into().trim().to_owned();
        self
    }

    /// Chooses whether dropped combinations are logged.
    #[must_use]
    pub fn with_filter_reporting(mut self, reporting: FilterReporting) -> Self {
        self.reporting = reporting;
        self
    }

    /// The parameter spaces being planned, in plan order.
    #[must_use]
    pub fn spaces(&self) -> &[ParameterSpace] {
        &self.spaces
    }

    /// Number of combinations across all spaces, saturating at `usize::MAX`.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.spaces
            .iter()
            .fold(0_usize, |acc, space| acc.saturating_add(space.combination_count()))
    }

    /// Builds the complete plan.
    ///
    /// # Errors
    /// Returns [`PlanError::UnknownAlgorithm`] as soon as a surviving tuple
    /// names an algorithm the executable does not implement,
    /// [`PlanError::SeedOverflow`] when the seed mixer cannot derive a seed,
    /// and [`PlanError::LogPathCollision`] when two runs would write the same
    /// log file. No plan is returned in those cases.
    #[instrument(
        name = "core.plan",
        skip(self),
        fields(combinations = self.combination_count()),
    )]
    pub fn plan(&self) -> Result<Plan, PlanError> {
        for space in &self.spaces {
            warn_on_shared_exponent_tokens(space);
        }

        let mut stats = PlanStats::default();
        let mut runs = Vec::new();
        let mut seen = HashSet::new();
        for declared in self.spaces.iter().flat_map(ParameterSpace::enumerate) {
            stats.enumerated += 1;
            if let Some(reason) = self.filter.rejection(&declared) {
                stats.rejected += 1;
                if self.reporting == FilterReporting::Log {
                    debug!(
                        %reason,
                        algorithm = %declared.algorithm,
                        seed = declared.seed,
                        node_count = declared.node_count,
                        degree = declared.degree,
                        exponent = declared.exponent,
                        simple = declared.simple,
                        threads = declared.threads,
                        "dropping invalid combination"
                    );
                }
                continue;
            }
            let tuple = self.scaling.apply(&declared)?;
            let command = self.commands.build(&tuple)?;
            let log_path = self.paths.encode(&tuple);
            if !seen.insert(log_path.clone()) {
                return Err(PlanError::LogPathCollision {
                    path: Arc::from(log_path.to_string()),
                });
            }
            runs.push(PlannedRun {
                tuple,
                command,
                log_path,
            });
        }
        stats.emitted = runs.len();

        info!(
            enumerated = stats.enumerated,
            rejected = stats.rejected,
            emitted = stats.emitted,
            "plan complete"
        );
        Ok(Plan {
            runs,
            stats,
            timing_wrapper: self.timing_wrapper.clone(),
        })
    }
}

fn warn_on_shared_exponent_tokens(space: &ParameterSpace) {
    let mut seen: BTreeMap<i64, f64> = BTreeMap::new();
    for &exponent in space.exponents() {
        let token = exponent_token(exponent);
        match seen.get(&token) {
            Some(&first) if first.to_bits() != exponent.to_bits() => warn!(
                token,
                first,
                second = exponent,
                "distinct exponents share a log-path token"
            ),
            Some(_) => {}
            None => {
                seen.insert(token, exponent);
            }
        }
    }
}
