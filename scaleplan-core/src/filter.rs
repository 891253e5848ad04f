//! Validity predicate for parameter tuples.

use std::fmt;

use crate::{algorithm::Algorithm, space::ParameterTuple};

/// Reason a tuple was excluded from the plan.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rejection {
    /// Simple graphs require a degree above one.
    SimpleGraphNeedsDegree,
    /// A thread count above one was paired with a sequential algorithm.
    SequentialAlgorithm,
}

impl Rejection {
    /// Short identifier used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleGraphNeedsDegree => "simple_graph_needs_degree",
            Self::SequentialAlgorithm => "sequential_algorithm",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Excludes semantically invalid combinations.
///
/// # Examples
/// ```
/// use scaleplan_core::{CombinationFilter, ParameterTuple, Rejection, ScalingMode};
///
/// let tuple = ParameterTuple {
///     seed: 1,
///     node_count: 100,
///     scaling: ScalingMode::Strong,
///     degree: 1,
///     exponent: 1.0,
///     simple: true,
///     resample: false,
///     algorithm: "dyn".into(),
///     threads: 1,
/// };
/// assert_eq!(
///     CombinationFilter.rejection(&tuple),
///     Some(Rejection::SimpleGraphNeedsDegree)
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CombinationFilter;

impl CombinationFilter {
    /// Returns `true` when `tuple` should be planned.
    #[must_use]
    pub fn is_valid(&self, tuple: &ParameterTuple) -> bool {
        self.rejection(tuple).is_none()
    }

    /// Returns why `tuple` is excluded, or `None` when it is valid.
    #[must_use]
    pub fn rejection(&self, tuple: &ParameterTuple) -> Option<Rejection> {
        if tuple.degree == 1 && tuple.simple {
            return Some(Rejection::SimpleGraphNeedsDegree);
        }
        if tuple.threads > 1 && !Algorithm::name_is_parallel_capable(&tuple.algorithm) {
            return Some(Rejection::SequentialAlgorithm);
        }
        None
    }
}
