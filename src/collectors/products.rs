//! Catalog walk: follows the "next" link from page to page.

use crate::config::Config;
use crate::error::ParseError;
use crate::html::{self, selectors::product, Document};
use crate::http::{FetchRequest, Fetcher};
use crate::models::{Collection, ProductRecord, StopReason};
use crate::pacing::Pacer;
use scraper::{ElementRef, Selector};
use tracing::{debug, info, trace, warn};
use url::Url;

/// What one catalog page yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub products: Vec<ProductRecord>,
    /// Containers missing a name, price or description
    pub skipped: usize,
    /// Absolute url of the following page, if any
    pub next_url: Result<Option<String>, ParseError>,
}

/// Parses a catalog page. Malformed product markup just yields fewer items;
/// only an unresolvable "next" href is reported, through `next_url`.
pub fn parse_catalog_page(body: &str, site_root: &str, current_url: &str) -> CatalogPage {
    let document = Document::parse(body);
    let mut products = Vec::new();
    let mut skipped = 0;

    let containers = document.select(&product::CONTAINER);
    if containers.is_empty() {
        debug!("No products found on {}", current_url);
    }

    for container in containers {
        match parse_container(container) {
            Some(record) => {
                trace!("Parsed product: {} - {}", record.name, record.price);
                products.push(record);
            }
            None => skipped += 1,
        }
    }

    let next_url = find_next_link(&document)
        .map(|href| resolve_href(&href, site_root, current_url))
        .transpose();

    CatalogPage { products, skipped, next_url }
}

fn parse_container(container: ElementRef<'_>) -> Option<ProductRecord> {
    let required = [&*product::NAME, &*product::PRICE, &*product::DESCRIPTION];
    if !required.into_iter().all(|selector| html::has_child(container, selector)) {
        return None;
    }

    let field = |selector: &Selector| {
        html::select_within(container, selector).map(html::text).unwrap_or_default()
    };
    Some(ProductRecord {
        name: field(&*product::NAME),
        price: field(&*product::PRICE),
        description: field(&*product::DESCRIPTION),
    })
}

/// Href of the first pagination link whose text carries a "next" marker.
fn find_next_link(document: &Document) -> Option<String> {
    let paging = document.select_first(&product::PAGING)?;
    paging
        .select(&product::PAGING_LINK)
        .filter(|link| {
            let label = html::text(*link);
            product::NEXT_MARKERS.iter().any(|marker| label.contains(marker))
        })
        .find_map(|link| html::attr(link, "href").filter(|href| !href.is_empty()))
}

/// Turns a pagination href into an absolute url.
///
/// Query-only hrefs (`?page=2`) are resolved against the current page, all
/// others against the site root.
pub fn resolve_href(
    href: &str,
    site_root: &str,
    current_url: &str,
) -> Result<String, ParseError> {
    let invalid = |e: url::ParseError| ParseError::InvalidLink {
        href: href.to_string(),
        message: e.to_string(),
    };

    let base = if href.starts_with('?') {
        Url::parse(current_url)
    } else {
        Url::parse(&format!("{}/", site_root.trim_end_matches('/')))
    }
    .map_err(invalid)?;

    base.join(href).map(String::from).map_err(invalid)
}

/// Walks the catalog from its first page until no "next" link remains.
pub struct ProductCollector<'a> {
    fetcher: &'a dyn Fetcher,
    pacer: &'a dyn Pacer,
    start_url: String,
    site_root: String,
    max_pages: u32,
}

impl<'a> ProductCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, pacer: &'a dyn Pacer, config: &Config) -> Self {
        Self {
            fetcher,
            pacer,
            start_url: config.products_url(),
            site_root: config.site_root().to_string(),
            max_pages: config.max_pages.max(1),
        }
    }

    pub async fn collect(&self) -> Collection<ProductRecord> {
        info!("Starting product collection at {}", self.start_url);

        let mut records = Vec::new();
        let mut skipped = 0;
        let mut pages = 0;
        let mut url = self.start_url.clone();

        let stop = loop {
            info!("Fetching: {}", url);
            let response = match self.fetcher.fetch(FetchRequest::get(&url)).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Error fetching product page: {}", e);
                    break StopReason::FetchFailed(e);
                }
            };

            let page = parse_catalog_page(&response.body, &self.site_root, &url);
            pages += 1;

            if page.skipped > 0 {
                warn!("Skipped {} incomplete products on {}", page.skipped, url);
            }
            debug!("Page {} yielded {} products", pages, page.products.len());

            skipped += page.skipped;
            records.extend(page.products);

            let next = match page.next_url {
                Ok(Some(next)) => next,
                Ok(None) => break StopReason::Exhausted,
                Err(e) => {
                    warn!("Bad pagination link on {}: {}", url, e);
                    break StopReason::ParseFailed(e);
                }
            };
            if pages >= self.max_pages {
                warn!("Reached page limit ({}), stopping", self.max_pages);
                break StopReason::PageLimit(self.max_pages);
            }

            self.pacer.pause(pages + 1).await;
            url = next;
        };

        info!("Collected {} products from {} pages ({})", records.len(), pages, stop);
        Collection { records, pages, skipped, stop }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::{CountingPacer, ScriptedFetcher};
    use crate::error::FetchError;

    const ROOT: &str = "http://shop.test";

    fn product_html(name: &str, price: &str, desc: &str) -> String {
        format!(
            r#"<div class="row product">
                <div class="description"><h3><a href="/product/1">{}</a></h3>
                <div class="short-description">{}</div></div>
                <div class="price-wrap"><div class="price">{}</div></div>
            </div>"#,
            name, desc, price
        )
    }

    fn page_html(products: &[String], next: Option<&str>) -> String {
        let paging = match next {
            Some(href) => format!(
                r#"<div class="paging"><a href="/products?page=1">&lt;</a><a href="{}">&gt;</a></div>"#,
                href
            ),
            None => r#"<div class="paging"><a href="/products?page=1">&lt;</a></div>"#.to_string(),
        };
        format!("<html><body>{}{}</body></html>", products.join(""), paging)
    }

    fn test_config() -> Config {
        Config { base_url: ROOT.to_string(), max_pages: 50, ..Config::default() }
    }

    #[test]
    fn test_parse_catalog_page() {
        let html = page_html(
            &[
                product_html("Box of Chocolate", "$24.99", "Delicious"),
                product_html("Red Potion", "$4.99", "Heals"),
            ],
            Some("/products?page=2"),
        );
        let page = parse_catalog_page(&html, ROOT, "http://shop.test/products");
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[0].name, "Box of Chocolate");
        assert_eq!(page.products[0].price, "$24.99");
        assert_eq!(page.products[1].description, "Heals");
        assert_eq!(page.skipped, 0);
        assert_eq!(page.next_url, Ok(Some("http://shop.test/products?page=2".to_string())));
    }

    #[test]
    fn test_incomplete_container_skipped_and_counted() {
        let broken = r#"<div class="row product"><div class="description"><h3><a>No price</a></h3>
            <div class="short-description">x</div></div></div>"#
            .to_string();
        let html = page_html(&[broken, product_html("Ok", "$1", "fine")], None);
        let page = parse_catalog_page(&html, ROOT, "http://shop.test/products");
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].name, "Ok");
        assert_eq!(page.skipped, 1);
        assert_eq!(page.next_url, Ok(None));
    }

    #[test]
    fn test_next_link_by_word() {
        let html = r#"<div class="paging"><a href="/products?page=1">Prev</a>
            <a href="https://other.test/products?page=3">Next page</a></div>"#;
        let page = parse_catalog_page(html, ROOT, "http://shop.test/products");
        assert!(page.products.is_empty());
        assert_eq!(page.next_url, Ok(Some("https://other.test/products?page=3".to_string())));
    }

    #[test]
    fn test_next_link_without_href_ignored() {
        let html = r#"<div class="paging"><a>&gt;</a></div>"#;
        let page = parse_catalog_page(html, ROOT, "http://shop.test/products");
        assert_eq!(page.next_url, Ok(None));
    }

    #[test]
    fn test_resolve_href() {
        let current = "http://shop.test/products?page=1";
        let expected = Ok("http://shop.test/products?page=2".to_string());
        assert_eq!(resolve_href("/products?page=2", ROOT, current), expected);
        assert_eq!(resolve_href("?page=2", ROOT, current), expected);
        assert_eq!(resolve_href("products?page=2", "http://shop.test/", current), expected);
        assert_eq!(resolve_href("../products?page=2", ROOT, current), expected);
        assert_eq!(resolve_href("https://x.test/p", ROOT, current), Ok("https://x.test/p".into()));
    }

    #[test]
    fn test_resolve_protocol_relative_href() {
        let resolved = resolve_href("//cdn.shop.test/products?page=2", ROOT, ROOT);
        assert_eq!(resolved, Ok("http://cdn.shop.test/products?page=2".to_string()));
    }

    #[test]
    fn test_resolve_mixed_case_scheme() {
        let resolved = resolve_href("HTTPS://Other.Test/products?page=2", ROOT, ROOT);
        assert_eq!(resolved, Ok("https://other.test/products?page=2".to_string()));
    }

    #[test]
    fn test_resolve_bad_href() {
        let err = resolve_href("http://", ROOT, ROOT).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLink { ref href, .. } if href == "http://"));
    }

    #[test]
    fn test_next_link_outside_paging_ignored() {
        let html = r#"<nav><a href="/blog?page=2">Next post</a></nav>
            <div class="paging"><a href="/products?page=1">&lt;</a></div>"#;
        let page = parse_catalog_page(html, ROOT, "http://shop.test/products");
        assert_eq!(page.next_url, Ok(None));
    }

    #[tokio::test]
    async fn test_two_pages_then_done() {
        let page1 = page_html(
            &[product_html("A", "$1", "a"), product_html("B", "$2", "b")],
            Some("/products?page=2"),
        );
        let page2 = page_html(&[product_html("C", "$3", "c")], None);
        let fetcher = ScriptedFetcher::new(vec![Ok(page1), Ok(page2)]);
        let pacer = CountingPacer::default();

        let collection = ProductCollector::new(&fetcher, &pacer, &test_config()).collect().await;

        let names: Vec<_> = collection.records.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(pacer.count(), 1);
        assert_eq!(collection.pages, 2);
        assert_eq!(collection.stop, StopReason::Exhausted);
        assert_eq!(
            fetcher.urls(),
            vec!["http://shop.test/products", "http://shop.test/products?page=2"]
        );
    }

    #[tokio::test]
    async fn test_empty_page_still_checks_pagination() {
        let page1 = page_html(&[], Some("/products?page=2"));
        let page2 = page_html(&[product_html("Late", "$9", "z")], None);
        let fetcher = ScriptedFetcher::new(vec![Ok(page1), Ok(page2)]);
        let pacer = CountingPacer::default();

        let collection = ProductCollector::new(&fetcher, &pacer, &test_config()).collect().await;
        assert_eq!(collection.len(), 1);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_earlier_pages() {
        let page1 = page_html(&[product_html("A", "$1", "a")], Some("/products?page=2"));
        let failure =
            FetchError::Status { status: 500, url: "http://shop.test/products?page=2".into() };
        let fetcher = ScriptedFetcher::new(vec![Ok(page1), Err(failure.clone())]);
        let pacer = CountingPacer::default();

        let collection = ProductCollector::new(&fetcher, &pacer, &test_config()).collect().await;
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.pages, 1);
        assert_eq!(collection.stop, StopReason::FetchFailed(failure));
    }

    #[tokio::test]
    async fn test_unresolvable_next_link_stops_with_parse_failure() {
        let page1 = page_html(&[product_html("A", "$1", "a")], Some("http://"));
        let fetcher = ScriptedFetcher::new(vec![Ok(page1)]);
        let pacer = CountingPacer::default();

        let collection = ProductCollector::new(&fetcher, &pacer, &test_config()).collect().await;
        assert_eq!(collection.len(), 1);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(pacer.count(), 0);
        assert!(matches!(collection.stop, StopReason::ParseFailed(ParseError::InvalidLink { .. })));
        assert!(collection.stop.is_failure());
    }

    #[tokio::test]
    async fn test_page_limit() {
        let looping = page_html(&[product_html("Same", "$1", "a")], Some("/products?page=2"));
        let fetcher =
            ScriptedFetcher::new(vec![Ok(looping.clone()), Ok(looping.clone()), Ok(looping)]);
        let pacer = CountingPacer::default();
        let config = Config { max_pages: 2, ..test_config() };

        let collection = ProductCollector::new(&fetcher, &pacer, &config).collect().await;
        assert_eq!(collection.len(), 2);
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(pacer.count(), 1);
        assert_eq!(collection.stop, StopReason::PageLimit(2));
    }
}
