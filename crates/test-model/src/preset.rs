use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
    /// Breaks the stream with an error carrying this message.
    #[serde(rename = "error")]
    Error(String),
}

/// The preset response for a narrative request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
    /// If set, the request will fail in the first `failure` attempts.
    /// `Some(0)` means the request will fail infinitely.
    #[serde(default)]
    pub failures: Option<u64>,
    /// How long the provider waits before answering.
    #[serde(default)]
    pub delay: Option<Duration>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            failures: None,
            delay: None,
        }
    }

    /// Creates a `PresetResponse` that streams `text` word by word.
    pub fn with_text(text: &str) -> Self {
        Self::with_events(
            text.split_inclusive(' ')
                .map(|word| PresetEvent::MessageDelta(word.to_owned()))
                .collect::<Vec<_>>(),
        )
    }

    /// Creates a `PresetResponse` that always fails.
    #[inline]
    pub fn failing() -> Self {
        Self::with_events(Vec::new()).with_failures(0)
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Delays the response.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// The preset answer for an image search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetImages {
    /// Regular-size URLs returned in order. Ignored when `failing` is set.
    pub urls: Vec<String>,
    /// Whether the search fails.
    #[serde(default)]
    pub failing: bool,
    /// How long the provider waits before answering.
    #[serde(default)]
    pub delay: Option<Duration>,
}

impl PresetImages {
    /// Creates a preset that returns the given URLs.
    pub fn with_urls<S: Into<String>>(urls: impl IntoIterator<Item = S>) -> Self {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            failing: false,
            delay: None,
        }
    }

    /// Creates a preset that returns no results.
    #[inline]
    pub fn empty() -> Self {
        Self::with_urls(Vec::<String>::new())
    }

    /// Creates a preset that fails.
    #[inline]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::empty()
        }
    }

    /// Delays the answer.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::MessageDelta("Once upon a time ".to_string()),
            PresetEvent::Error("connection reset".to_string()),
        ])
        .with_failures(2)
        .with_delay(Duration::from_millis(5));

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_with_text() {
        let response = PresetResponse::with_text("A: go left B: go right");
        assert_eq!(response.events.len(), 6);
        assert_eq!(
            response.events[0],
            PresetEvent::MessageDelta("A: ".to_owned())
        );
        assert_eq!(
            response.events[5],
            PresetEvent::MessageDelta("right".to_owned())
        );
    }

    #[test]
    fn test_minimal_json() {
        let images: PresetImages =
            serde_json::from_str(r#"{"urls":["http://img/1"]}"#).unwrap();
        assert_eq!(images, PresetImages::with_urls(["http://img/1"]));
    }
}
