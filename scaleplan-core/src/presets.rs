//! Built-in studies reproducing the historical scaling campaigns.

use std::{fmt, str::FromStr};

use crate::{
    error::SpaceError,
    scaling::{ScalingMode, SeedPolicy},
    space::{ParameterSpace, ParameterSpaceBuilder, Workload},
};

const CAMPAIGN_SEEDS: [u64; 4] = [1_235_345, 5_487_697_398, 12_346_127_834, 347_589_323];
const THREAD_SCALING_SEEDS: [u64; 4] = [5_487_697_398, 12_346_127, 3_475_323, 17_563_412];
const NODE_SCALING_ALGORITHMS: [&str; 3] = ["polypa", "par-polypa", "dyn"];

/// A named, ready-made study.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Preset {
    /// Weak (1e7 nodes) and strong (1e8 nodes) scaling of `par-polypa`
    /// over 1 to 64 threads.
    ParScaling,
    /// Single-thread runs of `polypa`, `par-polypa` and `dyn` over node
    /// counts 2^16, 2^18, ..., 2^28, plus a resampling `dyn` variant for
    /// degree 10.
    NodeScaling,
    /// Sweep of `dyn` over node counts 2^16 to 2^31 and every degree and
    /// exponent of interest.
    DynSweep,
    /// Strong scaling at 1e9 nodes comparing `par-polypa` against the
    /// sequential algorithms over odd thread counts.
    ThreadScaling,
}

impl Preset {
    /// Every preset in listing order.
    pub const ALL: [Self; 4] = [
        Self::ParScaling,
        Self::NodeScaling,
        Self::DynSweep,
        Self::ThreadScaling,
    ];

    /// Name accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ParScaling => "par-scaling",
            Self::NodeScaling => "node-scaling",
            Self::DynSweep => "dyn-sweep",
            Self::ThreadScaling => "thread-scaling",
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ParScaling => "weak and strong scaling of par-polypa over 1..=64 threads",
            Self::NodeScaling => "single-thread node scaling over 2^16..2^28 nodes",
            Self::DynSweep => "dyn over 2^16..2^31 nodes, five degrees and seven exponents",
            Self::ThreadScaling => "strong scaling at 1e9 nodes, par-polypa versus sequential",
        }
    }

    /// Seed policy the campaign was originally run with.
    ///
    /// Campaigns that passed base seeds through unchanged use
    /// [`SeedPolicy::SplitMix`].
    #[must_use]
    pub const fn seed_policy(self) -> SeedPolicy {
        match self {
            Self::ParScaling | Self::DynSweep => SeedPolicy::SplitMix,
            Self::NodeScaling => SeedPolicy::NodeModular,
            Self::ThreadScaling => SeedPolicy::Multiplicative,
        }
    }

    /// Builds the parameter spaces of the preset, planned in order.
    ///
    /// # Errors
    /// Propagates [`SpaceError`] from validation; the shipped presets are
    /// valid.
    ///
    /// # Examples
    /// ```
    /// use scaleplan_core::Preset;
    ///
    /// let spaces = Preset::ParScaling.spaces().expect("preset is valid");
    /// assert_eq!(spaces.len(), 1);
    /// assert_eq!(spaces[0].threads().len(), 64);
    /// ```
    pub fn spaces(self) -> Result<Vec<ParameterSpace>, SpaceError> {
        match self {
            Self::ParScaling => Ok(vec![
                ParameterSpace::builder()
                    .seeds(CAMPAIGN_SEEDS)
                    .workloads([
                        Workload::new(10_000_000, ScalingMode::Weak),
                        Workload::new(100_000_000, ScalingMode::Strong),
                    ])
                    .degrees([1, 10])
                    .exponents([0.5, 1.0, 1.5, 2.0])
                    .simple([true])
                    .resample([false])
                    .algorithms(["par-polypa"])
                    .threads(1..=64)
                    .build()?,
            ]),
            Self::NodeScaling => Ok(vec![
                node_scaling()
                    .degrees([1])
                    .simple([false])
                    .algorithms(NODE_SCALING_ALGORITHMS)
                    .build()?,
                node_scaling()
                    .degrees([10])
                    .simple([true])
                    .algorithms(NODE_SCALING_ALGORITHMS)
                    .build()?,
                node_scaling()
                    .degrees([10])
                    .simple([true])
                    .resample([true])
                    .algorithms(["dyn"])
                    .build()?,
            ]),
            Self::DynSweep => Ok(vec![
                ParameterSpace::builder()
                    .seeds(CAMPAIGN_SEEDS)
                    .node_counts((16..32).map(|shift| 1_u64 << shift))
                    .scaling_modes([ScalingMode::Strong])
                    .degrees([1, 2, 3, 5, 10])
                    .exponents([0.0, 0.5, 0.8, 1.0, 1.2, 1.5, 2.0])
                    .simple([false, true])
                    .resample([false])
                    .algorithms(["dyn"])
                    .threads([1])
                    .build()?,
            ]),
            Self::ThreadScaling => Ok(vec![
                ParameterSpace::builder()
                    .seeds(THREAD_SCALING_SEEDS)
                    .workloads([Workload::new(1_000_000_000, ScalingMode::Strong)])
                    .degrees([1])
                    .exponents([0.5, 1.0, 1.5])
                    .simple([false])
                    .resample([false])
                    .algorithms(["par-polypa", "polypa", "dyn"])
                    .threads((1..64).step_by(2))
                    .build()?,
            ]),
        }
    }
}

/// Axes shared by every part of [`Preset::NodeScaling`].
fn node_scaling() -> ParameterSpaceBuilder {
    ParameterSpace::builder()
        .seeds(CAMPAIGN_SEEDS)
        .node_counts((16..=28).step_by(2).map(|shift| 1_u64 << shift))
        .scaling_modes([ScalingMode::Strong])
        .exponents([0.5, 1.0, 1.5])
        .resample([false])
        .threads([1])
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown preset name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown preset `{0}`")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| UnknownPreset(s.to_owned()))
    }
}
