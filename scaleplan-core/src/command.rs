//! Invocation strings for the benchmark executable.

use std::fmt;

use crate::{algorithm::Algorithm, error::PlanError, space::ParameterTuple};

/// Executable invoked when no override is configured.
pub const DEFAULT_EXECUTABLE: &str = "target/release/rust-nlpa";

/// A complete invocation of the benchmark executable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Command(String);

impl Command {
    /// The invocation as shell text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the invocation carries `flag` as a separate argument.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.0.split_whitespace().any(|arg| arg == flag)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialises run tuples into [`Command`]s.
///
/// # Examples
/// ```
/// use scaleplan_core::{CommandBuilder, ParameterTuple, ScalingMode};
///
/// let tuple = ParameterTuple {
///     seed: 42,
///     node_count: 1_000,
///     scaling: ScalingMode::Strong,
///     degree: 2,
///     exponent: 1.0,
///     simple: true,
///     resample: false,
///     algorithm: "par-polypa".into(),
///     threads: 4,
/// };
/// let command = CommandBuilder::default().build(&tuple).expect("known algorithm");
/// assert_eq!(
///     command.as_str(),
///     "target/release/rust-nlpa -a par-polypa -s 42 -n 1000 -d 2 -e 1.000000 -t 4 -p"
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandBuilder {
    executable: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl CommandBuilder {
    /// Creates a builder invoking `executable`.
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Builds the invocation for `tuple`.
    ///
    /// `-t` is only passed to parallel-capable algorithms; `-p` and `-l`
    /// follow the simple and resample flags.
    ///
    /// # Errors
    /// Returns [`PlanError::UnknownAlgorithm`] when the tuple names an
    /// algorithm outside the executable's allow-list.
    pub fn build(&self, tuple: &ParameterTuple) -> Result<Command, PlanError> {
        let algorithm: Algorithm = tuple.algorithm.parse()?;
        let mut command = format!(
            "{} -a {algorithm} -s {} -n {} -d {} -e {:.6}",
            self.executable, tuple.seed, tuple.node_count, tuple.degree, tuple.exponent,
        );
        if algorithm.is_parallel_capable() {
            command.push_str(&format!(" -t {}", tuple.threads));
        }
        if tuple.simple {
            command.push_str(" -p");
        }
        if tuple.resample {
            command.push_str(" -l");
        }
        Ok(Command(command))
    }
}
