//! Testimonial walk over a page-numbered endpoint that answers either JSON
//! or an HTML fragment, decided per response.

use super::json_rating;
use crate::config::Config;
use crate::error::FetchError;
use crate::html::{self, selectors::testimonial, Document};
use crate::http::{FetchRequest, Fetcher};
use crate::models::{Collection, StopReason, TestimonialRecord};
use crate::pacing::Pacer;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

/// A testimonial page, by the representation the server chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestimonialPage {
    Json(Vec<TestimonialRecord>),
    Fragment(Vec<TestimonialRecord>),
}

impl TestimonialPage {
    pub fn records(&self) -> &[TestimonialRecord] {
        match self {
            TestimonialPage::Json(records) | TestimonialPage::Fragment(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<TestimonialRecord> {
        match self {
            TestimonialPage::Json(records) | TestimonialPage::Fragment(records) => records,
        }
    }
}

/// Decides the representation of `body` and extracts its testimonials.
///
/// A body is JSON when it decodes to an array or an object; anything else
/// (including scalars and markup) is parsed as a fragment.
pub fn classify(body: &str) -> TestimonialPage {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => TestimonialPage::Json(records_from_json(&items)),
        Ok(Value::Object(map)) => {
            let items = map.get("data").and_then(Value::as_array);
            TestimonialPage::Json(items.map(|list| records_from_json(list)).unwrap_or_default())
        }
        _ => TestimonialPage::Fragment(records_from_fragment(body)),
    }
}

fn records_from_json(items: &[Value]) -> Vec<TestimonialRecord> {
    items
        .iter()
        .filter_map(|item| {
            let Some(fields) = item.as_object() else {
                trace!("Skipping non-object testimonial item: {}", item);
                return None;
            };
            let text = fields.get("text").and_then(Value::as_str).unwrap_or_default();
            let stars = fields.get("rating").map(json_rating).unwrap_or(0);
            Some(TestimonialRecord::new(text, stars))
        })
        .collect()
}

fn records_from_fragment(body: &str) -> Vec<TestimonialRecord> {
    let document = Document::parse_fragment(body);

    document
        .select(&testimonial::CONTAINER)
        .into_iter()
        .map(|container| {
            let text = html::select_within(container, &testimonial::TEXT)
                .map(html::text)
                .unwrap_or_default();
            let stars = html::select_within(container, &testimonial::RATING)
                .map(|rating| html::count_within(rating, &testimonial::STAR_ICON))
                .unwrap_or(0);
            TestimonialRecord::new(text, stars as i64)
        })
        .collect()
}

/// Walks `?page=1, 2, ...` until the endpoint runs dry.
pub struct TestimonialCollector<'a> {
    fetcher: &'a dyn Fetcher,
    pacer: &'a dyn Pacer,
    endpoint: String,
    referer: String,
    user_agent: String,
    max_pages: u32,
}

impl<'a> TestimonialCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, pacer: &'a dyn Pacer, config: &Config) -> Self {
        Self {
            fetcher,
            pacer,
            endpoint: config.testimonials_url(),
            referer: config.testimonials_referer(),
            user_agent: config.user_agent.clone(),
            max_pages: config.max_pages.max(1),
        }
    }

    fn page_url(&self, page: u32) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.endpoint, separator, page)
    }

    /// Request carrying the headers the endpoint expects from its own widget.
    fn page_request(&self, page: u32) -> FetchRequest {
        FetchRequest::get(self.page_url(page))
            .header("User-Agent", &self.user_agent)
            .header("Referer", &self.referer)
            .header("HX-Request", "true")
            .header("HX-Current-URL", &self.referer)
    }

    pub async fn collect(&self) -> Collection<TestimonialRecord> {
        info!("Starting testimonial collection at {}", self.endpoint);

        let mut records = Vec::new();
        let mut page = 1;
        let mut pages = 0;

        let stop = loop {
            let request = self.page_request(page);
            info!("Fetching API: {}", request.url);

            let response = match self.fetcher.fetch(request).await {
                Ok(response) => response,
                Err(FetchError::Status { status, .. }) => {
                    info!("API status {}. Stopping.", status);
                    break StopReason::Exhausted;
                }
                Err(e) => {
                    warn!("Error scraping testimonials: {}", e);
                    break StopReason::FetchFailed(e);
                }
            };

            let parsed = classify(&response.body);
            if parsed.records().is_empty() {
                debug!("No more testimonials on page {}", page);
                break StopReason::EmptyPage;
            }
            pages += 1;

            let fragment = matches!(parsed, TestimonialPage::Fragment(_));
            info!(
                "  - Found {} testimonials ({})",
                parsed.records().len(),
                if fragment { "fragment" } else { "json" }
            );
            records.extend(parsed.into_records());

            if pages >= self.max_pages {
                warn!("Reached page limit ({}), stopping", self.max_pages);
                break StopReason::PageLimit(self.max_pages);
            }

            page += 1;
            // JSON pages are served pre-paginated; only fragments are paced.
            if fragment {
                self.pacer.pause(page).await;
            }
        };

        info!("Collected {} testimonials from {} pages ({})", records.len(), pages, stop);
        Collection { records, pages, skipped: 0, stop }
    }
}
