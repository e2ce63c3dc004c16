//! Review walk over a cursor-paginated GraphQL connection.

use super::json_rating;
use crate::config::Config;
use crate::error::ParseError;
use crate::http::{FetchRequest, Fetcher};
use crate::models::{Collection, ReviewRecord, StopReason};
use crate::pacing::Pacer;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, trace, warn};

pub const REVIEWS_QUERY: &str = r#"
query GetReviews($first: Int, $after: String) {
  reviews(first: $first, after: $after) {
    edges {
      node {
        rid
        text
        rating
        date
      }
      cursor
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ReviewsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReviewsData {
    #[serde(default)]
    reviews: Option<ReviewConnection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewConnection {
    #[serde(default)]
    edges: Option<Vec<ReviewEdge>>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct ReviewEdge {
    #[serde(default)]
    node: Option<ReviewNode>,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewNode {
    #[serde(default)]
    rid: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    rating: Option<serde_json::Value>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: Option<bool>,
}

/// One decoded page of the review connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsPage {
    pub records: Vec<ReviewRecord>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Request body for the page following `after`.
pub fn request_body(first: u32, after: Option<&str>) -> String {
    json!({
        "query": REVIEWS_QUERY,
        "variables": { "first": first, "after": after },
    })
    .to_string()
}

/// Decodes a GraphQL response into records and pagination info.
///
/// A response carrying `errors` and no `data` is a `ParseError::GraphQl`. A
/// response with no `reviews` connection decodes as an empty page. Null or
/// missing `pageInfo` reads as the last page; ratings are read leniently.
pub fn parse_reviews_page(body: &str) -> Result<ReviewsPage, ParseError> {
    let response: GraphQlResponse = serde_json::from_str(body)?;

    if response.data.is_none() && !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ParseError::GraphQl(messages.join("; ")));
    }

    let connection = response.data.and_then(|d| d.reviews).unwrap_or_default();

    let records = connection
        .edges
        .unwrap_or_default()
        .into_iter()
        .map(|edge| {
            let node = edge.node.unwrap_or_default();
            trace!("Review {:?}", node.rid);
            ReviewRecord {
                date: node.date.unwrap_or_default(),
                stars: node.rating.as_ref().map(json_rating).unwrap_or(0),
                text: node.text.unwrap_or_default(),
            }
        })
        .collect();

    let page_info = connection.page_info.unwrap_or_default();
    Ok(ReviewsPage {
        records,
        end_cursor: page_info.end_cursor,
        has_next_page: page_info.has_next_page.unwrap_or(false),
    })
}

/// Walks the review connection by echoing each `endCursor` back as `after`.
pub struct ReviewCollector<'a> {
    fetcher: &'a dyn Fetcher,
    pacer: &'a dyn Pacer,
    endpoint: String,
    page_size: u32,
    max_pages: u32,
}

impl<'a> ReviewCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, pacer: &'a dyn Pacer, config: &Config) -> Self {
        Self {
            fetcher,
            pacer,
            endpoint: config.graphql_url(),
            page_size: config.review_page_size.max(1),
            max_pages: config.max_pages.max(1),
        }
    }

    pub async fn collect(&self) -> Collection<ReviewRecord> {
        info!("Starting review collection at {}", self.endpoint);

        let mut records = Vec::new();
        let mut pages = 0;
        let mut cursor: Option<String> = None;

        let stop = loop {
            info!("Fetching reviews page {}...", pages + 1);
            let body = request_body(self.page_size, cursor.as_deref());
            let request = FetchRequest::post_json(&self.endpoint, body);

            let response = match self.fetcher.fetch(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Error fetching reviews: {}", e);
                    break StopReason::FetchFailed(e);
                }
            };

            let page = match parse_reviews_page(&response.body) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Error decoding reviews: {}", e);
                    break StopReason::ParseFailed(e);
                }
            };

            // An empty page ends the walk even if the server claims more follow.
            if page.records.is_empty() {
                info!("No reviews found in response");
                break StopReason::EmptyPage;
            }
            pages += 1;

            debug!(
                "Page {} returned {} reviews (has_next: {})",
                pages,
                page.records.len(),
                page.has_next_page
            );
            records.extend(page.records);

            if !page.has_next_page {
                break StopReason::Exhausted;
            }
            let Some(end_cursor) = page.end_cursor else {
                warn!("hasNextPage is set but endCursor is missing");
                break StopReason::ParseFailed(ParseError::MissingField("endCursor"));
            };
            if pages >= self.max_pages {
                warn!("Reached page limit ({}), stopping", self.max_pages);
                break StopReason::PageLimit(self.max_pages);
            }

            cursor = Some(end_cursor);
            self.pacer.pause(pages + 1).await;
        };

        info!("Collected {} reviews from {} pages ({})", records.len(), pages, stop);
        Collection { records, pages, skipped: 0, stop }
    }
}
