//! Run command: drives the selected collectors and writes their files.

use crate::collectors::{ProductCollector, ReviewCollector, TestimonialCollector};
use crate::config::{Config, PRODUCTS_FILE, REVIEWS_FILE, TESTIMONIALS_FILE};
use crate::http::{Fetcher, HttpClient};
use crate::models::{Collection, StopReason};
use crate::pacing::{self, Pacer};
use crate::sink::{self, Record, WriteOutcome};
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info};

/// The three data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    Products,
    Reviews,
    Testimonials,
}

impl CollectorKind {
    pub fn all() -> [CollectorKind; 3] {
        [CollectorKind::Products, CollectorKind::Reviews, CollectorKind::Testimonials]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            CollectorKind::Products => PRODUCTS_FILE,
            CollectorKind::Reviews => REVIEWS_FILE,
            CollectorKind::Testimonials => TESTIMONIALS_FILE,
        }
    }
}

impl std::str::FromStr for CollectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "products" | "product" => Ok(CollectorKind::Products),
            "reviews" | "review" => Ok(CollectorKind::Reviews),
            "testimonials" | "testimonial" => Ok(CollectorKind::Testimonials),
            _ => Err(format!("Unknown collector: {}. Use: products, reviews, testimonials", s)),
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorKind::Products => write!(f, "products"),
            CollectorKind::Reviews => write!(f, "reviews"),
            CollectorKind::Testimonials => write!(f, "testimonials"),
        }
    }
}

/// Outcome of writing one collector's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Saved { path: PathBuf, rows: usize },
    NothingToSave,
    Failed(String),
}

/// How one collector fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorReport {
    pub kind: CollectorKind,
    pub records: usize,
    pub pages: u32,
    pub skipped: usize,
    pub stop: StopReason,
    pub write: WriteStatus,
}

impl CollectorReport {
    /// True when the walk or the write ended on an error.
    pub fn failed(&self) -> bool {
        self.stop.is_failure() || matches!(self.write, WriteStatus::Failed(_))
    }
}

impl fmt::Display for CollectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<13} {:>6} records {:>4} pages {:>4} skipped  stop: {}",
            self.kind, self.records, self.pages, self.skipped, self.stop
        )?;
        match &self.write {
            WriteStatus::Saved { path, rows } => {
                write!(f, "\n  Saved {} items to {}", rows, path.display())
            }
            WriteStatus::NothingToSave => {
                write!(f, "\n  No data to save for {}", self.kind.file_name())
            }
            WriteStatus::Failed(e) => {
                write!(f, "\n  Failed to save {}: {}", self.kind.file_name(), e)
            }
        }
    }
}

/// Reports for every collector that ran, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub collectors: Vec<CollectorReport>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.collectors.iter().any(CollectorReport::failed)
    }

    pub fn get(&self, kind: CollectorKind) -> Option<&CollectorReport> {
        self.collectors.iter().find(|r| r.kind == kind)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.collectors.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Runs collectors in sequence; a failure in one never stops the others.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the run with the real HTTP client and the configured pause policy.
    pub async fn execute(&self, selection: &[CollectorKind]) -> Result<RunReport> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;
        let pacer = pacing::from_config(&self.config);

        Ok(self.execute_with(&client, pacer.as_ref(), selection).await)
    }

    /// Executes the run with the provided fetcher and pacer (for testing).
    pub async fn execute_with(
        &self,
        fetcher: &dyn Fetcher,
        pacer: &dyn Pacer,
        selection: &[CollectorKind],
    ) -> RunReport {
        let mut report = RunReport::default();

        for kind in CollectorKind::all() {
            if !selection.contains(&kind) {
                continue;
            }

            info!("--- Starting {} collection ---", kind);
            let collector_report = match kind {
                CollectorKind::Products => {
                    let collection =
                        ProductCollector::new(fetcher, pacer, &self.config).collect().await;
                    self.save(kind, collection)
                }
                CollectorKind::Reviews => {
                    let collection =
                        ReviewCollector::new(fetcher, pacer, &self.config).collect().await;
                    self.save(kind, collection)
                }
                CollectorKind::Testimonials => {
                    let collection =
                        TestimonialCollector::new(fetcher, pacer, &self.config).collect().await;
                    self.save(kind, collection)
                }
            };
            report.collectors.push(collector_report);
        }

        report
    }

    fn save<R: Record>(&self, kind: CollectorKind, collection: Collection<R>) -> CollectorReport {
        let path = self.config.output_path(kind.file_name());

        let write = match sink::write_records(&collection.records, &path) {
            Ok(WriteOutcome::Written { path, rows }) => WriteStatus::Saved { path, rows },
            Ok(WriteOutcome::NothingToWrite) => {
                info!("No data to save for {}", kind.file_name());
                WriteStatus::NothingToSave
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                WriteStatus::Failed(e.to_string())
            }
        };

        CollectorReport {
            kind,
            records: collection.records.len(),
            pages: collection.pages,
            skipped: collection.skipped,
            stop: collection.stop,
            write,
        }
    }
}
