//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PRODUCTS_FILE: &str = "products.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";
pub const TESTIMONIALS_FILE: &str = "testimonials.csv";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site root; the catalog walk starts at `{base_url}/products`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// GraphQL endpoint (defaults to `{base_url}/api/graphql`)
    #[serde(default)]
    pub graphql_url: Option<String>,

    /// Testimonial endpoint (defaults to `{base_url}/api/testimonials`)
    #[serde(default)]
    pub testimonials_url: Option<String>,

    /// Page the testimonial widget pretends to live on
    #[serde(default)]
    pub testimonials_referer: Option<String>,

    /// Directory receiving the CSV files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pause between pages in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the pause (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Grow the pause by this factor per page instead of keeping it fixed
    #[serde(default)]
    pub backoff_factor: Option<f64>,

    /// Upper bound for the growing pause
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Edges requested per GraphQL page
    #[serde(default = "default_review_page_size")]
    pub review_page_size: u32,

    /// Hard cap on pages walked by any single collector
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://web-scraping.dev".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_review_page_size() -> u32 {
    20
}

fn default_max_pages() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            graphql_url: None,
            testimonials_url: None,
            testimonials_referer: None,
            output_dir: default_output_dir(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            backoff_factor: None,
            max_delay_ms: default_max_delay_ms(),
            review_page_size: default_review_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("harvest.toml");
        if local_config.exists() {
            debug!("Found harvest.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("catalog-harvest").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("HARVEST_BASE_URL") {
            if !base_url.is_empty() {
                self.base_url = base_url;
            }
        }

        if let Ok(dir) = std::env::var("HARVEST_OUTPUT_DIR") {
            if !dir.is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }

        if let Ok(delay) = std::env::var("HARVEST_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(proxy) = std::env::var("HARVEST_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }

    /// Site root without a trailing slash.
    pub fn site_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// First catalog page.
    pub fn products_url(&self) -> String {
        format!("{}/products", self.site_root())
    }

    pub fn graphql_url(&self) -> String {
        self.graphql_url.clone().unwrap_or_else(|| format!("{}/api/graphql", self.site_root()))
    }

    pub fn testimonials_url(&self) -> String {
        self.testimonials_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/testimonials", self.site_root()))
    }

    pub fn testimonials_referer(&self) -> String {
        self.testimonials_referer
            .clone()
            .unwrap_or_else(|| format!("{}/testimonials", self.site_root()))
    }

    /// Destination path for one of the output files.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://web-scraping.dev");
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 0);
        assert!(config.backoff_factor.is_none());
        assert_eq!(config.max_delay_ms, 30_000);
        assert_eq!(config.review_page_size, 20);
        assert_eq!(config.max_pages, 500);
        assert!(config.proxy.is_none());
        assert!(config.user_agent.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_derived_urls() {
        let config = Config::default();
        assert_eq!(config.products_url(), "https://web-scraping.dev/products");
        assert_eq!(config.graphql_url(), "https://web-scraping.dev/api/graphql");
        assert_eq!(config.testimonials_url(), "https://web-scraping.dev/api/testimonials");
        assert_eq!(config.testimonials_referer(), "https://web-scraping.dev/testimonials");
    }

    #[test]
    fn test_derived_urls_trailing_slash() {
        let config = Config { base_url: "http://localhost:9000/".to_string(), ..Config::default() };
        assert_eq!(config.site_root(), "http://localhost:9000");
        assert_eq!(config.products_url(), "http://localhost:9000/products");
    }

    #[test]
    fn test_explicit_urls_win() {
        let config = Config {
            graphql_url: Some("http://gql.local/q".to_string()),
            testimonials_url: Some("http://t.local/list".to_string()),
            ..Config::default()
        };
        assert_eq!(config.graphql_url(), "http://gql.local/q");
        assert_eq!(config.testimonials_url(), "http://t.local/list");
    }

    #[test]
    fn test_output_path() {
        let config = Config { output_dir: PathBuf::from("/tmp/out"), ..Config::default() };
        assert_eq!(config.output_path(REVIEWS_FILE), PathBuf::from("/tmp/out/reviews.csv"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            base_url = "http://localhost:8080"
            output_dir = "out"
            delay_ms = 0
            review_page_size = 50
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.review_page_size, 50);
        assert_eq!(config.max_pages, 500);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            delay_ms = 250
            delay_jitter_ms = 100
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_ms, 250);
        assert_eq!(config.delay_jitter_ms, 100);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/harvest.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"max_pages = 3"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 3);
    }

    #[test]
    fn test_config_with_env() {
        let orig_dir = std::env::var("HARVEST_OUTPUT_DIR").ok();
        let orig_delay = std::env::var("HARVEST_DELAY").ok();

        std::env::set_var("HARVEST_OUTPUT_DIR", "/tmp/harvest-env");
        std::env::set_var("HARVEST_DELAY", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/harvest-env"));
        // Invalid delay is ignored
        assert_eq!(config.delay_ms, 1000);

        match orig_dir {
            Some(v) => std::env::set_var("HARVEST_OUTPUT_DIR", v),
            None => std::env::remove_var("HARVEST_OUTPUT_DIR"),
        }
        match orig_delay {
            Some(v) => std::env::set_var("HARVEST_DELAY", v),
            None => std::env::remove_var("HARVEST_DELAY"),
        }
    }
}
