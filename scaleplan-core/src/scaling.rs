//! Weak and strong scaling transforms and run-seed derivation.
//!
//! A [`ScalingPolicy`] turns a declared [`ParameterTuple`] into the tuple that
//! is actually run: weak scaling grows the node count with the thread count,
//! strong scaling keeps it fixed, and both derive a per-run seed through a
//! [`SeedMixer`].

use std::{fmt, str::FromStr};

use crate::{error::PlanError, space::ParameterTuple};

/// How the total problem size relates to the thread count.
///
/// # Examples
/// ```
/// use scaleplan_core::ScalingMode;
///
/// assert_eq!(ScalingMode::Weak.scaled_node_count(1_000, 4), 4_000);
/// assert_eq!(ScalingMode::Strong.scaled_node_count(1_000, 4), 1_000);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalingMode {
    /// Hold the per-worker load constant.
    Weak,
    /// Hold the total load constant.
    Strong,
}

impl ScalingMode {
    /// Both modes, weak first.
    pub const ALL: [Self; 2] = [Self::Weak, Self::Strong];

    /// Lowercase name used in log directories.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Strong => "strong",
        }
    }

    /// Node count actually generated for `threads` workers.
    ///
    /// Saturates at `u64::MAX`; [`crate::ParameterSpaceBuilder::build`]
    /// rejects studies that would reach it.
    #[must_use]
    pub const fn scaled_node_count(self, node_count: u64, threads: u32) -> u64 {
        match self {
            Self::Weak => node_count.saturating_mul(threads as u64),
            Self::Strong => node_count,
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scaling mode.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown scaling mode `{0}`; expected `weak` or `strong`")]
pub struct UnknownScalingMode(pub String);

impl FromStr for ScalingMode {
    type Err = UnknownScalingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weak" => Ok(Self::Weak),
            "strong" => Ok(Self::Strong),
            other => Err(UnknownScalingMode(other.to_owned())),
        }
    }
}

/// Derives the seed of one run from its declared tuple.
///
/// Implementations must be pure: the same tuple always maps to the same
/// derived seed. `None` means the seed cannot be derived without wrapping.
pub trait SeedMixer {
    /// Returns the seed handed to the executable.
    fn derive(&self, tuple: &ParameterTuple) -> Option<u64>;
}

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Modulus of [`NodeModularSeed`], `2^63 - 1`.
pub const NODE_SEED_MODULUS: u64 = (1 << 63) - 1;

/// Splitmix64 finaliser applied to the base seed xor-ed with a
/// thread-dependent offset.
///
/// Every step is a bijection on `u64`, so for a fixed seed each thread count
/// yields a different derived seed, and for a fixed thread count each base
/// seed does too.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SplitMixSeed;

impl SeedMixer for SplitMixSeed {
    fn derive(&self, tuple: &ParameterTuple) -> Option<u64> {
        Some(splitmix64(
            tuple.seed ^ u64::from(tuple.threads).wrapping_mul(GOLDEN_GAMMA),
        ))
    }
}

const fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Multiplies the base seed by the thread count.
///
/// Matches the seeds of the historical thread-scaling runs. Products that do
/// not fit in `u64` are refused instead of wrapping onto other seeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MultiplicativeSeed;

impl SeedMixer for MultiplicativeSeed {
    fn derive(&self, tuple: &ParameterTuple) -> Option<u64> {
        tuple.seed.checked_mul(u64::from(tuple.threads))
    }
}

/// `node_count * seed mod (2^63 - 1)`, the seeds of the historical
/// node-scaling runs.
///
/// Node counts coprime to the modulus (every power of two is) map distinct
/// seeds below the modulus to distinct derived seeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NodeModularSeed;

impl SeedMixer for NodeModularSeed {
    fn derive(&self, tuple: &ParameterTuple) -> Option<u64> {
        let product = u128::from(tuple.node_count) * u128::from(tuple.seed);
        u64::try_from(product % u128::from(NODE_SEED_MODULUS)).ok()
    }
}

/// Runtime-selectable choice between the shipped mixers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SeedPolicy {
    /// [`SplitMixSeed`].
    #[default]
    SplitMix,
    /// [`MultiplicativeSeed`].
    Multiplicative,
    /// [`NodeModularSeed`].
    NodeModular,
}

impl SeedMixer for SeedPolicy {
    fn derive(&self, tuple: &ParameterTuple) -> Option<u64> {
        match self {
            Self::SplitMix => SplitMixSeed.derive(tuple),
            Self::Multiplicative => MultiplicativeSeed.derive(tuple),
            Self::NodeModular => NodeModularSeed.derive(tuple),
        }
    }
}

/// Applies the scaling mode and seed derivation to a tuple.
///
/// # Examples
/// ```
/// use scaleplan_core::{ParameterTuple, ScalingMode, ScalingPolicy, SeedPolicy};
///
/// let policy = ScalingPolicy::new(SeedPolicy::Multiplicative);
/// let tuple = ParameterTuple {
///     seed: 7,
///     node_count: 1_000,
///     scaling: ScalingMode::Weak,
///     degree: 2,
///     exponent: 1.0,
///     simple: false,
///     resample: false,
///     algorithm: "par-polypa".into(),
///     threads: 3,
/// };
/// let run = policy.apply(&tuple).expect("seed fits");
/// assert_eq!(run.node_count, 3_000);
/// assert_eq!(run.seed, 21);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScalingPolicy<M = SeedPolicy> {
    mixer: M,
}

impl<M: SeedMixer> ScalingPolicy<M> {
    /// Creates a policy deriving seeds with `mixer`.
    #[must_use]
    pub const fn new(mixer: M) -> Self {
        Self { mixer }
    }

    /// Produces the tuple that is actually run for `tuple`.
    ///
    /// # Errors
    /// Returns [`PlanError::SeedOverflow`] when the mixer cannot derive a
    /// seed for `tuple`.
    pub fn apply(&self, tuple: &ParameterTuple) -> Result<ParameterTuple, PlanError> {
        let seed = self
            .mixer
            .derive(tuple)
            .ok_or(PlanError::SeedOverflow {
                seed: tuple.seed,
                threads: tuple.threads,
            })?;
        Ok(ParameterTuple {
            seed,
            node_count: tuple.scaling.scaled_node_count(tuple.node_count, tuple.threads),
            ..tuple.clone()
        })
    }
}
