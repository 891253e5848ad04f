//! JSON study files.
//!
//! A study file lists the values of every experiment axis. Flag axes default
//! to `[false]` and thread counts to `[1]`. Workloads are given either as
//! explicit `{"node_count", "scaling"}` pairs or as `node_counts` crossed with
//! `scaling_modes`.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use scaleplan_core::{ParameterSpace, ScalingMode, SpaceError, Workload};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a study file.
#[derive(Debug, Error)]
pub enum StudyError {
    /// The file could not be opened or read.
    #[error("failed to read study `{path}`: {source}")]
    Io {
        /// Path of the study file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid study document.
    #[error("failed to parse study `{path}`: {source}")]
    Parse {
        /// Path of the study file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Axis declarations as written in a study file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyFile {
    /// Base seeds.
    pub seeds: Vec<u64>,
    /// Explicit workloads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workloads: Vec<Workload>,
    /// Node counts crossed with [`Self::scaling_modes`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_counts: Vec<u64>,
    /// Scaling modes crossed with [`Self::node_counts`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scaling_modes: Vec<ScalingMode>,
    /// Target average degrees.
    pub degrees: Vec<u32>,
    /// Attachment exponents.
    pub exponents: Vec<f64>,
    /// Simple-graph flags.
    #[serde(default = "StudyFile::default_flags")]
    pub simple: Vec<bool>,
    /// Resample flags.
    #[serde(default = "StudyFile::default_flags")]
    pub resample: Vec<bool>,
    /// Algorithm names.
    pub algorithms: Vec<String>,
    /// Thread counts.
    #[serde(default = "StudyFile::default_threads")]
    pub threads: Vec<u32>,
}

impl StudyFile {
    fn default_flags() -> Vec<bool> {
        vec![false]
    }

    fn default_threads() -> Vec<u32> {
        vec![1]
    }

    /// Reads a study file from disk.
    ///
    /// # Errors
    /// Returns [`StudyError::Io`] when the file cannot be opened and
    /// [`StudyError::Parse`] when its contents are not a valid study.
    pub fn load(path: &Path) -> Result<Self, StudyError> {
        let file = File::open(path).map_err(|source| StudyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file))
    }

    /// Parses a study from `reader`; `path` is only used in errors.
    ///
    /// # Errors
    /// Returns [`StudyError::Parse`] when the contents are not a valid study.
    pub fn from_reader(path: &Path, reader: impl Read) -> Result<Self, StudyError> {
        serde_json::from_reader(reader).map_err(|source| StudyError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the declarations into a [`ParameterSpace`].
    ///
    /// # Errors
    /// Returns [`SpaceError`] when the axes are inconsistent.
    pub fn into_space(self) -> Result<ParameterSpace, SpaceError> {
        ParameterSpace::builder()
            .seeds(self.seeds)
            .workloads(self.workloads)
            .node_counts(self.node_counts)
            .scaling_modes(self.scaling_modes)
            .degrees(self.degrees)
            .exponents(self.exponents)
            .simple(self.simple)
            .resample(self.resample)
            .algorithms(self.algorithms)
            .threads(self.threads)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(raw: &str) -> Result<StudyFile, StudyError> {
        StudyFile::from_reader(Path::new("inline.json"), raw.as_bytes())
    }

    #[rstest]
    fn minimal_study_takes_defaults() {
        let study = parse(
            r#"{
                "seeds": [42],
                "node_counts": [1000],
                "degrees": [2],
                "exponents": [1.0],
                "algorithms": ["par-polypa"]
            }"#,
        )
        .expect("study must parse");
        assert_eq!(study.simple, vec![false]);
        assert_eq!(study.resample, vec![false]);
        assert_eq!(study.threads, vec![1]);

        let space = study.into_space().expect("axes are valid");
        assert_eq!(space.workloads(), [Workload::new(1_000, ScalingMode::Strong)]);
    }

    #[rstest]
    fn explicit_workloads_keep_their_modes() {
        let study = parse(
            r#"{
                "seeds": [1],
                "workloads": [
                    {"node_count": 10000000, "scaling": "weak"},
                    {"node_count": 100000000, "scaling": "strong"}
                ],
                "degrees": [10],
                "exponents": [0.5],
                "simple": [true],
                "algorithms": ["par-polypa"],
                "threads": [1, 2]
            }"#,
        )
        .expect("study must parse");
        let space = study.into_space().expect("axes are valid");
        assert_eq!(space.combination_count(), 4);
        assert_eq!(space.threads(), [1, 2]);
    }

    #[rstest]
    fn both_workload_forms_are_rejected() {
        let study = parse(
            r#"{
                "seeds": [1],
                "workloads": [{"node_count": 10, "scaling": "weak"}],
                "node_counts": [20],
                "degrees": [2],
                "exponents": [1.0],
                "algorithms": ["dyn"]
            }"#,
        )
        .expect("study must parse");
        assert_eq!(study.into_space(), Err(SpaceError::AmbiguousWorkloads));
    }

    #[rstest]
    #[case::unknown_field(r#"{"seeds": [1], "degrees": [], "exponents": [], "algorithms": [], "nodes": [1]}"#)]
    #[case::missing_seeds(r#"{"degrees": [2], "exponents": [1.0], "algorithms": ["dyn"]}"#)]
    #[case::bad_mode(r#"{"seeds": [1], "scaling_modes": ["medium"], "degrees": [], "exponents": [], "algorithms": []}"#)]
    #[case::not_json("seeds: [1]")]
    fn malformed_studies_fail_to_parse(#[case] raw: &str) {
        let err = parse(raw).expect_err("study must be rejected");
        assert!(matches!(err, StudyError::Parse { ref path, .. } if path == Path::new("inline.json")));
    }

    #[rstest]
    fn missing_files_report_their_path() {
        let err = StudyFile::load(Path::new("does/not/exist.json")).expect_err("file is missing");
        assert!(matches!(err, StudyError::Io { ref path, .. } if path.ends_with("exist.json")));
    }
}
