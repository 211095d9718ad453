use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A single hit of an image search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageResult {
    /// Link to the image at the "regular" display size.
    pub regular_url: String,
}

impl ImageResult {
    /// Creates a result with only the regular-size link.
    #[inline]
    pub fn with_url<S: Into<String>>(url: S) -> Self {
        Self {
            regular_url: url.into(),
        }
    }
}

/// A type that represents an image search provider.
///
/// Like [`crate::ModelProvider`], the provider should behave like a
/// stateless object once created.
pub trait ImageProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Searches images that match the free-text `query`.
    ///
    /// Results are ordered by relevance. An empty list is a valid answer
    /// and must not be reported as an error.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ImageResult>, Self::Error>> + Send + 'static;
}
