//! Closed allow-list of algorithms understood by the benchmark executable.

use std::{fmt, str::FromStr, sync::Arc};

use crate::error::PlanError;

const EXPECTED_NAMES: &str = "dyn, polypa, polypa-prefetch, par-polypa";

/// Sampling algorithm accepted by the `-a` flag of the benchmark executable.
///
/// # Examples
/// ```
/// use scaleplan_core::Algorithm;
///
/// let algorithm: Algorithm = "par-polypa".parse().expect("known algorithm");
/// assert!(algorithm.is_parallel_capable());
/// assert_eq!(algorithm.as_str(), "par-polypa");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Algorithm {
    /// Dynamic weighted index sampling.
    DynWeightIndex,
    /// Sequential polynomial preferential attachment.
    PolyPa,
    /// Sequential polynomial preferential attachment with prefetching.
    PolyPaPrefetch,
    /// Parallel polynomial preferential attachment.
    ParallelPolyPa,
}

impl Algorithm {
    /// Every algorithm in allow-list order.
    pub const ALL: [Self; 4] = [
        Self::DynWeightIndex,
        Self::PolyPa,
        Self::PolyPaPrefetch,
        Self::ParallelPolyPa,
    ];

    /// Name used on the command line and in log directories.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DynWeightIndex => "dyn",
            Self::PolyPa => "polypa",
            Self::PolyPaPrefetch => "polypa-prefetch",
            Self::ParallelPolyPa => "par-polypa",
        }
    }

    /// Whether the executable honours a thread count for this algorithm.
    #[must_use]
    pub const fn is_parallel_capable(self) -> bool {
        matches!(self, Self::ParallelPolyPa)
    }

    /// Returns `true` when `name` refers to a parallel-capable algorithm.
    ///
    /// Unknown names are reported as not parallel-capable; rejecting them is
    /// left to [`crate::CommandBuilder`].
    #[must_use]
    pub fn name_is_parallel_capable(name: &str) -> bool {
        name.parse::<Self>()
            .is_ok_and(|algorithm| algorithm.is_parallel_capable())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| PlanError::UnknownAlgorithm {
                name: Arc::from(s),
                expected: EXPECTED_NAMES,
            })
    }
}
