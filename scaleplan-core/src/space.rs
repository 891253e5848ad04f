//! Experiment axes and their lazy Cartesian product.
//!
//! A [`ParameterSpace`] is declared once per study through
//! [`ParameterSpaceBuilder`]. [`ParameterSpace::enumerate`] walks every
//! combination with an odometer over axis indices: the last axis (thread
//! count) varies fastest, the first (seed) slowest.

use std::{collections::BTreeSet, fmt, iter::FusedIterator, sync::Arc};

use crate::{error::SpaceError, scaling::ScalingMode};

const AXES: usize = 8;

/// Node count paired with the scaling mode it is studied under.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workload {
    /// Node count before scaling.
    pub node_count: u64,
    /// Scaling mode applied to the node count.
    pub scaling: ScalingMode,
}

impl Workload {
    /// Creates a workload.
    #[must_use]
    pub const fn new(node_count: u64, scaling: ScalingMode) -> Self {
        Self {
            node_count,
            scaling,
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.node_count, self.scaling)
    }
}

/// One combination of axis values.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterTuple {
    /// Seed handed to the executable.
    pub seed: u64,
    /// Number of nodes to generate.
    pub node_count: u64,
    /// Scaling mode of the workload this tuple came from.
    pub scaling: ScalingMode,
    /// Target average degree.
    pub degree: u32,
    /// Attachment exponent.
    pub exponent: f64,
    /// Disallow multi-edges and self-loops.
    pub simple: bool,
    /// Resample previously drawn hosts.
    pub resample: bool,
    /// Algorithm name as declared by the study.
    pub algorithm: Arc<str>,
    /// Worker thread count.
    pub threads: u32,
}

/// Validated axis declarations of one study.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpace {
    seeds: Vec<u64>,
    workloads: Vec<Workload>,
    degrees: Vec<u32>,
    exponents: Vec<f64>,
    simple: Vec<bool>,
    resample: Vec<bool>,
    algorithms: Vec<Arc<str>>,
    threads: Vec<u32>,
}

impl ParameterSpace {
    /// Starts declaring a space.
    #[must_use]
    pub fn builder() -> ParameterSpaceBuilder {
        ParameterSpaceBuilder::default()
    }

    /// Lazily yields every combination in declaration order.
    ///
    /// # Examples
    /// ```
    /// use scaleplan_core::ParameterSpace;
    ///
    /// let space = ParameterSpace::builder()
    ///     .seeds([1, 2])
    ///     .node_counts([100])
    ///     .degrees([2])
    ///     .exponents([1.0])
    ///     .algorithms(["par-polypa"])
    ///     .threads([1, 2, 4])
    ///     .build()
    ///     .expect("axes are valid");
    /// let pairs: Vec<_> = space.enumerate().map(|t| (t.seed, t.threads)).collect();
    /// assert_eq!(pairs, [(1, 1), (1, 2), (1, 4), (2, 1), (2, 2), (2, 4)]);
    /// ```
    #[must_use]
    pub fn enumerate(&self) -> Tuples<'_> {
        let cursor = self.lengths().iter().all(|&len| len > 0).then_some([0; AXES]);
        Tuples {
            space: self,
            cursor,
        }
    }

    /// Number of combinations, saturating at `usize::MAX`.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.lengths()
            .iter()
            .fold(1_usize, |acc, &len| acc.saturating_mul(len))
    }

    /// Declared seeds.
    #[must_use]
    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Declared workloads.
    #[must_use]
    pub fn workloads(&self) -> &[Workload] {
        &self.workloads
    }

    /// Declared degrees.
    #[must_use]
    pub fn degrees(&self) -> &[u32] {
        &self.degrees
    }

    /// Declared exponents.
    #[must_use]
    pub fn exponents(&self) -> &[f64] {
        &self.exponents
    }

    /// Declared algorithm names.
    #[must_use]
    pub fn algorithms(&self) -> &[Arc<str>] {
        &self.algorithms
    }

    /// Declared thread counts.
    #[must_use]
    pub fn threads(&self) -> &[u32] {
        &self.threads
    }

    fn lengths(&self) -> [usize; AXES] {
        [
            self.seeds.len(),
            self.workloads.len(),
            self.degrees.len(),
            self.exponents.len(),
            self.simple.len(),
            self.resample.len(),
            self.algorithms.len(),
            self.threads.len(),
        ]
    }

    fn tuple_at(&self, cursor: [usize; AXES]) -> Option<ParameterTuple> {
        let [seed, workload, degree, exponent, simple, resample, algorithm, threads] = cursor;
        let workload = self.workloads.get(workload)?;
        Some(ParameterTuple {
            seed: *self.seeds.get(seed)?,
            node_count: workload.node_count,
            scaling: workload.scaling,
            degree: *self.degrees.get(degree)?,
            exponent: *self.exponents.get(exponent)?,
            simple: *self.simple.get(simple)?,
            resample: *self.resample.get(resample)?,
            algorithm: Arc::clone(self.algorithms.get(algorithm)?),
            threads: *self.threads.get(threads)?,
        })
    }

    fn advance(&self, mut cursor: [usize; AXES]) -> Option<[usize; AXES]> {
        let lengths = self.lengths();
        for axis in (0..AXES).rev() {
            let (Some(index), Some(&len)) = (cursor.get_mut(axis), lengths.get(axis)) else {
                return None;
            };
            *index += 1;
            if *index < len {
                return Some(cursor);
            }
            *index = 0;
        }
        None
    }
}

/// Lazy iterator returned by [`ParameterSpace::enumerate`].
#[derive(Debug)]
pub struct Tuples<'a> {
    space: &'a ParameterSpace,
    cursor: Option<[usize; AXES]>,
}

impl Iterator for Tuples<'_> {
    type Item = ParameterTuple;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        self.cursor = self.space.advance(cursor);
        self.space.tuple_at(cursor)
    }
}

impl FusedIterator for Tuples<'_> {}

/// Declares the axes of a [`ParameterSpace`].
///
/// `simple` and `resample` default to `[false]`, `threads` to `[1]`, and
/// `scaling_modes` to `[strong]` when only node counts are given. Every axis
/// must list distinct values.
#[derive(Clone, Debug, Default)]
pub struct ParameterSpaceBuilder {
    seeds: Vec<u64>,
    workloads: Vec<Workload>,
    node_counts: Vec<u64>,
    scaling_modes: Vec<ScalingMode>,
    degrees: Vec<u32>,
    exponents: Vec<f64>,
    simple: Option<Vec<bool>>,
    resample: Option<Vec<bool>>,
    algorithms: Vec<Arc<str>>,
    threads: Option<Vec<u32>>,
}

impl ParameterSpaceBuilder {
    /// Sets the seed axis.
    #[must_use]
    pub fn seeds(mut self, seeds: impl IntoIterator<Item = u64>) -> Self {
        self.seeds = seeds.into_iter().collect();
        self
    }

    /// Sets the workload axis from explicit `(node count, scaling mode)` pairs.
    #[must_use]
    pub fn workloads(mut self, workloads: impl IntoIterator<Item = Workload>) -> Self {
        self.workloads = workloads.into_iter().collect();
        self
    }

    /// Sets the node counts combined with [`Self::scaling_modes`].
    #[must_use]
    pub fn node_counts(mut self, node_counts: impl IntoIterator<Item = u64>) -> Self {
        self.node_counts = node_counts.into_iter().collect();
        self
    }

    /// Sets the scaling modes combined with [`Self::node_counts`].
    #[must_use]
    pub fn scaling_modes(mut self, modes: impl IntoIterator<Item = ScalingMode>) -> Self {
        self.scaling_modes = modes.into_iter().collect();
        self
    }

    /// Sets the degree axis.
    #[must_use]
    pub fn degrees(mut self, degrees: impl IntoIterator<Item = u32>) -> Self {
        self.degrees = degrees.into_iter().collect();
        self
    }

    /// Sets the exponent axis.
    #[must_use]
    pub fn exponents(mut self, exponents: impl IntoIterator<Item = f64>) -> Self {
        self.exponents = exponents.into_iter().collect();
        self
    }

    /// Sets the simple-graph flag axis.
    #[must_use]
    pub fn simple(mut self, flags: impl IntoIterator<Item = bool>) -> Self {
        self.simple = Some(flags.into_iter().collect());
        self
    }

    /// Sets the resample flag axis.
    #[must_use]
    pub fn resample(mut self, flags: impl IntoIterator<Item = bool>) -> Self {
        self.resample = Some(flags.into_iter().collect());
        self
    }

    /// Sets the algorithm axis. Names are checked when commands are built.
    #[must_use]
    pub fn algorithms<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.algorithms = names
            .into_iter()
            .map(|name| Arc::from(name.as_ref()))
            .collect();
        self
    }

    /// Sets the thread-count axis.
    #[must_use]
    pub fn threads(mut self, threads: impl IntoIterator<Item = u32>) -> Self {
        self.threads = Some(threads.into_iter().collect());
        self
    }

    /// Validates the declarations and produces the space.
    ///
    /// # Errors
    /// Returns [`SpaceError::AmbiguousWorkloads`] when both workload forms are
    /// used, [`SpaceError::ZeroThreadCount`] for a zero thread count,
    /// [`SpaceError::NonFiniteExponent`] for a NaN or infinite exponent,
    /// [`SpaceError::WeakScalingOverflow`] when a weak workload cannot be
    /// scaled to the largest thread count, and
    /// [`SpaceError::DuplicateAxisValue`] when an axis repeats a value.
    pub fn build(self) -> Result<ParameterSpace, SpaceError> {
        let workloads = self.resolve_workloads()?;
        let threads = self.threads.unwrap_or_else(|| vec![1]);
        let simple = self.simple.unwrap_or_else(|| vec![false]);
        let resample = self.resample.unwrap_or_else(|| vec![false]);
        if threads.contains(&0) {
            return Err(SpaceError::ZeroThreadCount);
        }
        if let Some(&value) = self.exponents.iter().find(|value| !value.is_finite()) {
            return Err(SpaceError::NonFiniteExponent { value });
        }
        ensure_distinct("seed", &self.seeds, |seed| *seed)?;
        ensure_distinct("workload", &workloads, |w| (w.node_count, w.scaling))?;
        ensure_distinct("degree", &self.degrees, |degree| *degree)?;
        ensure_distinct("exponent", &self.exponents, |exponent| exponent.to_bits())?;
        ensure_distinct("simple", &simple, |flag| *flag)?;
        ensure_distinct("resample", &resample, |flag| *flag)?;
        ensure_distinct("algorithm", &self.algorithms, Arc::clone)?;
        ensure_distinct("threads", &threads, |count| *count)?;
        if let Some(&max_threads) = threads.iter().max() {
            let overflowing = workloads.iter().find(|workload| {
                workload.scaling == ScalingMode::Weak
                    && workload
                        .node_count
                        .checked_mul(u64::from(max_threads))
                        .is_none()
            });
            if let Some(workload) = overflowing {
                return Err(SpaceError::WeakScalingOverflow {
                    node_count: workload.node_count,
                    threads: max_threads,
                });
            }
        }

        Ok(ParameterSpace {
            seeds: self.seeds,
            workloads,
            degrees: self.degrees,
            exponents: self.exponents,
            simple,
            resample,
            algorithms: self.algorithms,
            threads,
        })
    }

    fn resolve_workloads(&self) -> Result<Vec<Workload>, SpaceError> {
        let split_form = !self.node_counts.is_empty() || !self.scaling_modes.is_empty();
        if !self.workloads.is_empty() {
            return if split_form {
                Err(SpaceError::AmbiguousWorkloads)
            } else {
                Ok(self.workloads.clone())
            };
        }

        let modes = if self.scaling_modes.is_empty() {
            vec![ScalingMode::Strong]
        } else {
            self.scaling_modes.clone()
        };
        Ok(self
            .node_counts
            .iter()
            .flat_map(|&node_count| {
                modes
                    .iter()
                    .map(move |&scaling| Workload::new(node_count, scaling))
            })
            .collect())
    }
}

fn ensure_distinct<T, K>(
    axis: &'static str,
    values: &[T],
    key: impl Fn(&T) -> K,
) -> Result<(), SpaceError>
where
    T: fmt::Display,
    K: Ord,
{
    let mut seen = BTreeSet::new();
    match values.iter().find(|value| !seen.insert(key(value))) {
        Some(value) => Err(SpaceError::DuplicateAxisValue {
            axis,
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}
