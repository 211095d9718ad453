use std::fmt::{self, Debug, Formatter};

/// The endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Photo orientation filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Wider than tall, the default since illustrations sit above the text.
    #[default]
    Landscape,
    /// Taller than wide.
    Portrait,
    /// Roughly square.
    Squarish,
}

impl Orientation {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Squarish => "squarish",
        }
    }
}

/// Builder for [`UnsplashConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnsplashConfigBuilder {
    access_key: String,
    base_url: Option<String>,
    orientation: Orientation,
    per_page: u8,
}

impl UnsplashConfigBuilder {
    /// Creates a builder with the given access key.
    #[inline]
    pub fn with_access_key<S: Into<String>>(access_key: S) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: None,
            orientation: Orientation::default(),
            per_page: 1,
        }
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the orientation filter.
    #[inline]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets how many results to request, clamped to `1..=30`.
    #[inline]
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 30);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> UnsplashConfig {
        let base_url = self
            .base_url
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        UnsplashConfig {
            access_key: self.access_key,
            base_url,
            orientation: self.orientation,
            per_page: self.per_page,
        }
    }
}

impl Debug for UnsplashConfigBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsplashConfigBuilder")
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("orientation", &self.orientation)
            .field("per_page", &self.per_page)
            .finish()
    }
}

/// Configuration for the Unsplash image provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnsplashConfig {
    pub(crate) access_key: String,
    pub(crate) base_url: String,
    pub(crate) orientation: Orientation,
    pub(crate) per_page: u8,
}

impl UnsplashConfig {
    #[inline]
    pub(crate) fn search_url(&self) -> String {
        format!("{}/search/photos", self.base_url)
    }

    /// Query pairs sent with a search, children-safe content only.
    pub(crate) fn query_pairs(&self, query: &str) -> [(&'static str, String); 5] {
        [
            ("query", query.to_owned()),
            ("orientation", self.orientation.as_str().to_owned()),
            ("content_filter", "high".to_owned()),
            ("per_page", self.per_page.to_string()),
            ("client_id", self.access_key.clone()),
        ]
    }
}

impl Debug for UnsplashConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsplashConfig")
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("orientation", &self.orientation)
            .field("per_page", &self.per_page)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let config = UnsplashConfigBuilder::with_access_key("key").build();
        assert_eq!(config.search_url(), "https://api.unsplash.com/search/photos");
        let pairs = config.query_pairs("dragon cave treasure");
        assert_eq!(pairs[0], ("query", "dragon cave treasure".to_owned()));
        assert_eq!(pairs[1], ("orientation", "landscape".to_owned()));
        assert_eq!(pairs[2], ("content_filter", "high".to_owned()));
        assert_eq!(pairs[3], ("per_page", "1".to_owned()));
        assert_eq!(pairs[4], ("client_id", "key".to_owned()));
        assert!(!format!("{config:?}").contains("\"key\""));
    }

    #[test]
    fn test_overrides() {
        let config = UnsplashConfigBuilder::with_access_key("key")
            .with_base_url("http://localhost:9000/")
            .with_orientation(Orientation::Squarish)
            .with_per_page(100)
            .build();
        assert_eq!(config.search_url(), "http://localhost:9000/search/photos");
        let pairs = config.query_pairs("x");
        assert_eq!(pairs[1].1, "squarish");
        assert_eq!(pairs[3].1, "30");
    }
}
