//! CLI command implementations.

pub mod run;

pub use run::{CollectorKind, CollectorReport, RunCommand, RunReport, WriteStatus};
