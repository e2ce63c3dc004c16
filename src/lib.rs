//! catalog-harvest - paginated catalog, review and testimonial harvester
//!
//! Three independent collectors walk a site's HTML catalog, its GraphQL
//! review connection and its testimonial feed, and write one CSV file each.

pub mod collectors;
pub mod commands;
pub mod config;
pub mod error;
pub mod html;
pub mod http;
pub mod models;
pub mod pacing;
pub mod sink;

pub use config::Config;
pub use error::{FetchError, ParseError, SchemaMismatchError, SinkError};
pub use models::{Collection, ProductRecord, ReviewRecord, StopReason, TestimonialRecord};
