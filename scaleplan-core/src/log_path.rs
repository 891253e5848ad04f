//! Canonical log-file paths for planned runs.
//!
//! Every field that can vary between runs is encoded, so two distinct run
//! tuples never share a log file. The one deliberate exception is the
//! exponent, which is stored as a tenth-resolution integer token (see
//! [`exponent_token`]); studies must keep their exponents at least `0.1`
//! apart.

use std::fmt;

use crate::space::ParameterTuple;

/// Root directory used when no override is configured.
pub const DEFAULT_LOG_ROOT: &str = "logs";

/// Encodes an exponent as `floor(exponent * 10)`.
///
/// The encoding is lossy: exponents that differ by less than `0.1` can map to
/// the same token, e.g. `1.05` and `1.08` both become `10`. Inputs beyond the
/// `i64` range saturate.
///
/// # Examples
/// ```
/// use scaleplan_core::exponent_token;
///
/// assert_eq!(exponent_token(1.5), 15);
/// assert_eq!(exponent_token(0.0), 0);
/// assert_eq!(exponent_token(1.05), exponent_token(1.08));
/// ```
#[must_use]
pub fn exponent_token(exponent: f64) -> i64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the token is defined as the saturating integer floor"
    )]
    let token = (exponent * 10.0).floor() as i64;
    token
}

/// Location of one run's combined stdout and stderr.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct LogPath {
    directory: String,
    file_name: String,
}

impl LogPath {
    /// Directory holding the log file.
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// File name within [`Self::directory`].
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for LogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory, self.file_name)
    }
}

/// Maps run tuples to [`LogPath`]s under a root directory.
///
/// Paths follow `<root>/<algorithm>/<scaling>/n<nodes>_d<degree>_s<simple>_e<token>_<seed>_l<resample>_t<threads>.log`.
///
/// # Examples
/// ```
/// use scaleplan_core::{LogPathEncoder, ParameterTuple, ScalingMode};
///
/// let tuple = ParameterTuple {
///     seed: 42,
///     node_count: 1_000,
///     scaling: ScalingMode::Weak,
///     degree: 2,
///     exponent: 1.5,
///     simple: true,
///     resample: false,
///     algorithm: "par-polypa".into(),
///     threads: 8,
/// };
/// let path = LogPathEncoder::default().encode(&tuple);
/// assert_eq!(
///     path.to_string(),
///     "logs/par-polypa/weak/n1000_d2_s1_e15_42_l0_t8.log"
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogPathEncoder {
    root: String,
}

impl Default for LogPathEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_ROOT)
    }
}

impl LogPathEncoder {
    /// Creates an encoder placing logs below `root`. Trailing slashes are
    /// dropped.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.len() > 1 && root.ends_with('/') {
            root.pop();
        }
        Self { root }
    }

    /// Configured root directory.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Encodes `tuple` into its log path.
    #[must_use]
    pub fn encode(&self, tuple: &ParameterTuple) -> LogPath {
        LogPath {
            directory: format!("{}/{}/{}", self.root, tuple.algorithm, tuple.scaling),
            file_name: format!(
                "n{}_d{}_s{}_e{}_{}_l{}_t{}.log",
                tuple.node_count,
                tuple.degree,
                u8::from(tuple.simple),
                exponent_token(tuple.exponent),
                tuple.seed,
                u8::from(tuple.resample),
                tuple.threads,
            ),
        }
    }
}
