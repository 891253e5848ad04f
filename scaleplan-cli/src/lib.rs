//! Support library for the scaleplan CLI binary.
//!
//! Exposes the CLI, logging and study-file modules so doctests and integration
//! tests can exercise the planning pipeline without forking a subprocess.

pub mod cli;
pub mod logging;
pub mod study;
