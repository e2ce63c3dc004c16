//! Paginated collectors, one per data category.
//!
//! Each collector walks its source strictly sequentially and never fails as a
//! whole: it returns whatever it gathered together with the reason it stopped.

pub mod products;
pub mod reviews;
pub mod testimonials;

pub use products::ProductCollector;
pub use reviews::ReviewCollector;
pub use testimonials::{TestimonialCollector, TestimonialPage};

use serde_json::Value;

/// Numeric rating from a JSON value; integers, floats and numeric strings count.
pub(crate) fn json_rating(value: &Value) -> i64 {
    match value {
        Value::Number(n) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)).unwrap_or(0)
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
