//! Record shapes produced by the collectors and the outcome of one walk.

use crate::error::{FetchError, ParseError};
use crate::sink::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Price as displayed, currency symbol retained
    pub price: String,
    pub description: String,
}

/// One review edge from the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Source-provided date, e.g. `2023-01-22`
    pub date: String,
    pub stars: i64,
    pub text: String,
}

/// One testimonial, from either the JSON or the fragment representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonialRecord {
    pub text: String,
    /// Always within 0..=5
    pub stars: u8,
}

pub const MAX_STARS: u8 = 5;

impl TestimonialRecord {
    /// Builds a record, clamping `stars` onto the 0..=5 scale.
    pub fn new(text: impl Into<String>, stars: i64) -> Self {
        Self { text: text.into(), stars: stars.clamp(0, MAX_STARS as i64) as u8 }
    }
}

impl Record for ProductRecord {
    fn field_names(&self) -> Vec<&'static str> {
        vec!["name", "price", "description"]
    }

    fn values(&self) -> Vec<String> {
        vec![self.name.clone(), self.price.clone(), self.description.clone()]
    }
}

impl Record for ReviewRecord {
    fn field_names(&self) -> Vec<&'static str> {
        vec!["date", "stars", "text"]
    }

    fn values(&self) -> Vec<String> {
        vec![self.date.clone(), self.stars.to_string(), self.text.clone()]
    }
}

impl Record for TestimonialRecord {
    fn field_names(&self) -> Vec<&'static str> {
        vec!["text", "stars"]
    }

    fn values(&self) -> Vec<String> {
        vec![self.text.clone(), self.stars.to_string()]
    }
}

/// Why a collector stopped walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The source declared or implied there is nothing further.
    Exhausted,
    /// A page came back with no items.
    EmptyPage,
    /// The configured page cap was reached.
    PageLimit(u32),
    FetchFailed(FetchError),
    ParseFailed(ParseError),
}

impl StopReason {
    /// True when the walk ended on an error rather than on exhaustion.
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::FetchFailed(_) | StopReason::ParseFailed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "exhausted"),
            StopReason::EmptyPage => write!(f, "empty page"),
            StopReason::PageLimit(limit) => write!(f, "page limit ({}) reached", limit),
            StopReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            StopReason::ParseFailed(e) => write!(f, "parse failed: {}", e),
        }
    }
}

/// Everything a collector gathered, plus how the walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T> {
    pub records: Vec<T>,
    /// Pages whose content was consumed
    pub pages: u32,
    /// Items dropped because a required sub-element was missing
    pub skipped: usize,
    pub stop: StopReason,
}

impl<T> Collection<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
