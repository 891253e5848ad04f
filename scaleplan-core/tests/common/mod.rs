use scaleplan_core::{ParameterSpace, ParameterSpaceBuilder, ScalingMode};

/// Axes of the two-thread strong-scaling smoke study.
#[must_use]
pub fn smoke_study() -> ParameterSpaceBuilder {
    ParameterSpace::builder()
        .seeds([42])
        .node_counts([1_000])
        .scaling_modes([ScalingMode::Strong])
        .degrees([2])
        .exponents([1.0])
        .algorithms(["par-polypa"])
        .threads([1, 2])
}

/// Splits a log file name into its `_`-separated tokens.
#[must_use]
pub fn file_tokens(file_name: &str) -> Vec<&str> {
    file_name.trim_end_matches(".log").split('_').collect()
}
