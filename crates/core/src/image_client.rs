use std::pin::Pin;
use std::sync::Arc;

use storybeat_model::{ImageProvider, ImageResult};
use tracing::Instrument;

use crate::error::ProviderError;

type SearchResult = Result<Vec<ImageResult>, ProviderError>;
type BoxedSearchFuture = Pin<Box<dyn Future<Output = SearchResult> + Send>>;
type SearchFn = Arc<dyn Fn(&str) -> BoxedSearchFuture + Send + Sync>;

/// Type-erased counterpart of [`crate::model_client::ModelClient`] for
/// image providers.
#[derive(Clone)]
pub struct ImageClient {
    search_fn: SearchFn,
}

impl ImageClient {
    #[inline]
    pub fn new<P: ImageProvider + 'static>(provider: P) -> Self {
        let search_fn: SearchFn = Arc::new(move |query| {
            let fut = provider.search(query);
            Box::pin(
                async move {
                    fut.await.map_err(|err| {
                        debug!("image search failed: {err:?}");
                        ProviderError::from_raw(&err)
                    })
                }
                .instrument(trace_span!("image client req", query)),
            )
        });
        Self { search_fn }
    }

    /// Searches images for `query`.
    #[inline]
    pub async fn search(&self, query: &str) -> SearchResult {
        (self.search_fn)(query).await
    }
}

#[cfg(test)]
mod tests {
    use storybeat_test_model::{PresetImages, TestImageProvider};

    use super::*;

    #[tokio::test]
    async fn test_search() {
        let provider = TestImageProvider::default();
        provider.add_images("cat", PresetImages::with_urls(["http://img/cat"]));
        provider.add_images("dog", PresetImages::failing());

        let client = ImageClient::new(provider);
        let results = client.search("cat").await.unwrap();
        assert_eq!(results, vec![ImageResult::with_url("http://img/cat")]);
        assert!(client.search("dog").await.is_err());
    }
}
