//! Command implementations and argument parsing for the scaleplan CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{
    Arg, ArgGroup, ArgMatches, Args, FromArgMatches, Parser, Subcommand, ValueEnum,
    error::ErrorKind, value_parser,
};
use scaleplan_core::{
    DEFAULT_EXECUTABLE, DEFAULT_LOG_ROOT, DEFAULT_TIMING_WRAPPER, FilterReporting, ParameterSpace,
    Plan, PlanError, Planner, Preset, SeedPolicy, SpaceError,
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::study::{StudyError, StudyFile};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "scaleplan",
    about = "Plan NLPA scaling benchmarks for a line-oriented job dispatcher."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print one timing-wrapped benchmark invocation per experiment.
    Emit(PlanCommand),
    /// Print the log directories the plan writes to, one per line.
    Dirs(PlanCommand),
    /// List the built-in studies.
    Presets,
}

/// Options shared by the planning commands.
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Study to plan.
    #[command(flatten)]
    pub source: StudySource,

    /// Benchmark executable invoked by every command.
    #[arg(long, default_value = DEFAULT_EXECUTABLE)]
    pub executable: String,

    /// Wrapper measuring each run; pass an empty string to disable.
    #[arg(long, default_value = DEFAULT_TIMING_WRAPPER)]
    pub timing_wrapper: String,

    /// Directory below which log files are placed.
    #[arg(long, default_value = DEFAULT_LOG_ROOT)]
    pub log_root: String,

    /// How per-run seeds are derived. Presets default to the policy their
    /// campaign used, study files to `splitmix`.
    #[arg(long, value_enum)]
    pub seed_policy: Option<SeedPolicyArg>,

    /// Log every dropped parameter combination at debug level.
    #[arg(long)]
    pub report_filtered: bool,
}

/// Where the study comes from. Exactly one of `--preset` and `--study` is
/// accepted on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudySource {
    /// Built-in study.
    Preset(Preset),
    /// JSON study file.
    File(PathBuf),
}

impl FromArgMatches for StudySource {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        if let Some(name) = matches.get_one::<PresetName>("preset") {
            return Ok(Self::Preset(Preset::from(*name)));
        }
        if let Some(path) = matches.get_one::<PathBuf>("study") {
            return Ok(Self::File(path.clone()));
        }
        Err(clap::Error::raw(
            ErrorKind::MissingRequiredArgument,
            "one of --preset or --study is required\n",
        ))
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl Args for StudySource {
    fn augment_args(cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("preset")
                .long("preset")
                .value_name("PRESET")
                .help("Built-in study")
                .value_parser(value_parser!(PresetName)),
        )
        .arg(
            Arg::new("study")
                .long("study")
                .value_name("FILE")
                .help("JSON study file")
                .value_parser(value_parser!(PathBuf)),
        )
        .group(
            ArgGroup::new("study-source")
                .args(["preset", "study"])
                .required(true)
                .multiple(false),
        )
    }

    fn augment_args_for_update(cmd: clap::Command) -> clap::Command {
        Self::augment_args(cmd)
    }
}

/// Built-in study names.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetName {
    /// Weak and strong scaling of `par-polypa`.
    ParScaling,
    /// Sequential node-count scaling from 2^16 to 2^28 nodes.
    NodeScaling,
    /// Sequential `dyn` sweep over sixteen powers of two.
    DynSweep,
    /// Strong scaling at 1e9 nodes across algorithms.
    ThreadScaling,
}

impl From<PresetName> for Preset {
    fn from(name: PresetName) -> Self {
        match name {
            PresetName::ParScaling => Self::ParScaling,
            PresetName::NodeScaling => Self::NodeScaling,
            PresetName::DynSweep => Self::DynSweep,
            PresetName::ThreadScaling => Self::ThreadScaling,
        }
    }
}

/// Seed derivation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedPolicyArg {
    /// Splitmix64 mixing of seed and thread count.
    Splitmix,
    /// Seed multiplied by the thread count.
    Multiplicative,
    /// Node count times seed, modulo 2^63 - 1.
    NodeModular,
}

impl From<SeedPolicyArg> for SeedPolicy {
    fn from(arg: SeedPolicyArg) -> Self {
        match arg {
            SeedPolicyArg::Splitmix => Self::SplitMix,
            SeedPolicyArg::Multiplicative => Self::Multiplicative,
            SeedPolicyArg::NodeModular => Self::NodeModular,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The study file could not be read.
    #[error(transparent)]
    Study(#[from] StudyError),
    /// The study declares inconsistent axes.
    #[error("invalid study: {0}")]
    Space(#[from] SpaceError),
    /// Planning hit a fatal configuration error.
    #[error("planning aborted: {0}")]
    Plan(#[from] PlanError),
}

impl CliError {
    /// Stable machine-readable code of the underlying core error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Study(_) => None,
            Self::Space(err) => Some(err.code().as_str()),
            Self::Plan(err) => Some(err.code().as_str()),
        }
    }
}

/// Result of executing a CLI command, ready to be rendered.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// A complete plan.
    Plan(Plan),
    /// Log directories of a plan.
    Directories(Vec<String>),
    /// Built-in studies.
    Presets(Vec<Preset>),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the study cannot be loaded or planning fails.
///
/// # Examples
/// ```
/// # use scaleplan_cli::cli::{Cli, Command, CommandOutput, run_cli};
/// let output = run_cli(Cli { command: Command::Presets }).expect("listing cannot fail");
/// assert!(matches!(output, CommandOutput::Presets(ref presets) if presets.len() == 4));
/// ```
pub fn run_cli(cli: Cli) -> Result<CommandOutput, CliError> {
    match cli.command {
        Command::Emit(command) => Ok(CommandOutput::Plan(plan_command(command)?)),
        Command::Dirs(command) => {
            let plan = plan_command(command)?;
            Ok(CommandOutput::Directories(
                plan.log_directories()
                    .into_iter()
                    .map(ToOwned::to_owned)
                    .collect(),
            ))
        }
        Command::Presets => Ok(CommandOutput::Presets(Preset::ALL.to_vec())),
    }
}

/// Spaces of a study and the seed policy it plans with unless overridden.
#[derive(Debug, Clone)]
pub(super) struct LoadedStudy {
    pub(super) spaces: Vec<ParameterSpace>,
    pub(super) seed_policy: SeedPolicy,
}

#[instrument(name = "cli.plan", skip(command), fields(seed_policy = ?command.seed_policy))]
pub(super) fn plan_command(command: PlanCommand) -> Result<Plan, CliError> {
    let study = load_study(command.source)?;
    let seed_policy = command
        .seed_policy
        .map_or(study.seed_policy, SeedPolicy::from);
    let reporting = if command.report_filtered {
        FilterReporting::Log
    } else {
        FilterReporting::Silent
    };
    let plan = Planner::from_spaces(study.spaces)
        .with_executable(command.executable)
        .with_timing_wrapper(command.timing_wrapper)
        .with_log_root(command.log_root)
        .with_filter_reporting(reporting)
        .with_seed_mixer(seed_policy)
        .plan()?;
    Ok(plan)
}

pub(super) fn load_study(source: StudySource) -> Result<LoadedStudy, CliError> {
    match source {
        StudySource::Preset(preset) => {
            info!(preset = %preset, "planning built-in study");
            Ok(LoadedStudy {
                spaces: preset.spaces()?,
                seed_policy: preset.seed_policy(),
            })
        }
        StudySource::File(path) => {
            info!(study = %path.display(), "planning study file");
            Ok(LoadedStudy {
                spaces: vec![StudyFile::load(&path)?.into_space()?],
                seed_policy: SeedPolicy::default(),
            })
        }
    }
}

/// Renders `output` to `writer`.
///
/// Plans become dispatcher lines, directories and presets one per line.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_output(output: &CommandOutput, mut writer: impl Write) -> io::Result<()> {
    match output {
        CommandOutput::Plan(plan) => plan.write_lines(writer),
        CommandOutput::Directories(directories) => {
            for directory in directories {
                writeln!(writer, "{directory}")?;
            }
            Ok(())
        }
        CommandOutput::Presets(presets) => {
            for preset in presets {
                writeln!(writer, "{}\t{}", preset.name(), preset.description())?;
            }
            Ok(())
        }
    }
}
