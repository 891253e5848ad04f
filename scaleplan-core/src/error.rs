//! Error types for the scaleplan core library.
//!
//! Planning aborts with a [`PlanError`] when a study names an unknown
//! algorithm or when the chosen seed policy would make two runs share a log
//! file. Problems with the axis declarations themselves surface earlier,
//! while the parameter space is being built, as [`SpaceError`].

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Fatal error raised while turning a parameter space into a plan.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PlanError {
    /// The study references an algorithm the benchmark executable does not
    /// implement.
    #[error("unknown algorithm `{name}`; expected one of {expected}")]
    UnknownAlgorithm {
        /// Algorithm name as declared by the study.
        name: Arc<str>,
        /// Comma-separated list of accepted names.
        expected: &'static str,
    },
    /// The seed policy cannot derive a run seed without wrapping.
    #[error("seed {seed} cannot be derived for {threads} threads without overflowing u64")]
    SeedOverflow {
        /// Base seed declared by the study.
        seed: u64,
        /// Thread count of the run.
        threads: u32,
    },
    /// Two runs would write the same log file.
    #[error("two runs share the log file `{path}`")]
    LogPathCollision {
        /// Shared log path.
        path: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`PlanError`] variants.
    enum PlanErrorCode for PlanError {
        /// The study references an unknown algorithm.
        UnknownAlgorithm => UnknownAlgorithm { .. } => "PLAN_UNKNOWN_ALGORITHM",
        /// The seed policy overflowed.
        SeedOverflow => SeedOverflow { .. } => "PLAN_SEED_OVERFLOW",
        /// Two runs share a log file.
        LogPathCollision => LogPathCollision { .. } => "PLAN_LOG_PATH_COLLISION",
    }
}

/// Error raised while validating axis declarations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SpaceError {
    /// Thread counts must be at least one.
    #[error("thread counts must be at least 1 (got 0)")]
    ZeroThreadCount,
    /// Exponents must be finite so they can be rendered and encoded.
    #[error("exponent {value} is not finite")]
    NonFiniteExponent {
        /// Offending exponent.
        value: f64,
    },
    /// Weak scaling would push the node count past `u64::MAX`.
    #[error("weak scaling of {node_count} nodes by {threads} threads overflows u64")]
    WeakScalingOverflow {
        /// Base node count of the weak workload.
        node_count: u64,
        /// Largest thread count of the study.
        threads: u32,
    },
    /// Workloads were given both as explicit pairs and as separate node-count
    /// and scaling-mode axes.
    #[error("workloads must be declared either as pairs or as node counts with scaling modes, not both")]
    AmbiguousWorkloads,
    /// An axis lists the same value twice.
    #[error("the {axis} axis lists `{value}` more than once")]
    DuplicateAxisValue {
        /// Name of the axis.
        axis: &'static str,
        /// The repeated value.
        value: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`SpaceError`] variants.
    enum SpaceErrorCode for SpaceError {
        /// Thread counts must be at least one.
        ZeroThreadCount => ZeroThreadCount => "SPACE_ZERO_THREAD_COUNT",
        /// Exponents must be finite.
        NonFiniteExponent => NonFiniteExponent { .. } => "SPACE_NON_FINITE_EXPONENT",
        /// Weak scaling overflows the node count.
        WeakScalingOverflow => WeakScalingOverflow { .. } => "SPACE_WEAK_SCALING_OVERFLOW",
        /// Workloads were declared twice.
        AmbiguousWorkloads => AmbiguousWorkloads => "SPACE_AMBIGUOUS_WORKLOADS",
        /// An axis repeats a value.
        DuplicateAxisValue => DuplicateAxisValue { .. } => "SPACE_DUPLICATE_AXIS_VALUE",
    }
}

/// Convenient alias for results returned by the planning API.
pub type Result<T, E = PlanError> = core::result::Result<T, E>;
