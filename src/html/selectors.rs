//! CSS selectors for the catalog and testimonial markup.
//!
//! Update this file when the site changes its HTML structure; the
//! collectors never spell out selector strings themselves.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for catalog listing pages.
pub mod product {
    use super::*;

    /// One catalog entry.
    pub static CONTAINER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.row.product").unwrap());

    pub static NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".description h3 a").unwrap());

    /// Displayed price, currency symbol included.
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".price-wrap .price").unwrap());

    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".short-description").unwrap());

    /// Pagination bar under the product list.
    pub static PAGING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.paging").unwrap());

    /// Links inside the pagination bar.
    pub static PAGING_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    /// Link texts that mark the "next page" control.
    pub const NEXT_MARKERS: [&str; 2] = [">", "Next"];
}

/// Selectors for testimonial fragments.
pub mod testimonial {
    use super::*;

    pub static CONTAINER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.testimonial").unwrap());

    pub static TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.text").unwrap());

    pub static RATING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.rating").unwrap());

    /// One marker is rendered per star.
    pub static STAR_ICON: LazyLock<Selector> = LazyLock::new(|| Selector::parse("svg").unwrap());
}
