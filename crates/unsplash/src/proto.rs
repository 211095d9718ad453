use serde::Deserialize;
use serde::de::IgnoredAny;
use storybeat_model::ImageResult;

#[derive(Clone, Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Converts the well-formed photos, keeping their order. A malformed
    /// entry does not spoil the ones around it.
    pub fn into_results(self) -> Vec<ImageResult> {
        self.results
            .into_iter()
            .filter_map(|hit| match hit {
                SearchHit::Photo(photo) => Some(photo.into()),
                SearchHit::Malformed(_) => None,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchHit {
    Photo(Photo),
    Malformed(IgnoredAny),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Photo {
    pub urls: Urls,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Urls {
    pub regular: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

impl From<Photo> for ImageResult {
    fn from(photo: Photo) -> Self {
        ImageResult::with_url(photo.urls.regular)
    }
}
