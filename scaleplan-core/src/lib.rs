//! Scaleplan core library.
//!
//! Plans scaling experiments for the NLPA graph generators: a
//! [`ParameterSpace`] is enumerated, each tuple is scaled by a
//! [`ScalingPolicy`], filtered by a [`CombinationFilter`], and turned into a
//! [`Command`] and a [`LogPath`] by [`Planner::plan`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod algorithm;
mod command;
mod error;
mod filter;
mod log_path;
mod planner;
mod presets;
mod scaling;
mod space;

pub use crate::{
    algorithm::Algorithm,
    command::{Command, CommandBuilder, DEFAULT_EXECUTABLE},
    error::{PlanError, PlanErrorCode, Result, SpaceError, SpaceErrorCode},
    filter::{CombinationFilter, Rejection},
    log_path::{DEFAULT_LOG_ROOT, LogPath, LogPathEncoder, exponent_token},
    planner::{DEFAULT_TIMING_WRAPPER, FilterReporting, Plan, PlanStats, PlannedRun, Planner},
    presets::{Preset, UnknownPreset},
    scaling::{
        MultiplicativeSeed, NODE_SEED_MODULUS, NodeModularSeed, ScalingMode, ScalingPolicy,
        SeedMixer, SeedPolicy, SplitMixSeed, UnknownScalingMode,
    },
    space::{ParameterSpace, ParameterSpaceBuilder, ParameterTuple, Tuples, Workload},
};
