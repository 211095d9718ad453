//! Local fake providers for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use storybeat_model::{
    ErrorKind, ImageProvider, ImageResult, ModelFinishReason, ModelProvider,
    ModelRequest, ModelResponse, ModelResponseEvent, ProviderError,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

const EVENT_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: Vec<PresetEvent>,
    event_idx: usize,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            let idx = this.event_idx;
            this.event_idx += 1;
            return match this.events.get(idx) {
                Some(PresetEvent::MessageDelta(msg)) => Poll::Ready(Ok(Some(
                    ModelResponseEvent::MessageDelta(msg.clone()),
                ))),
                Some(PresetEvent::Error(msg)) => {
                    // Nothing is delivered after a broken stream.
                    this.event_idx = usize::MAX;
                    Poll::Ready(Err(Error::new(msg.clone(), ErrorKind::Other)))
                }
                None if idx == this.events.len() => Poll::Ready(Ok(Some(
                    ModelResponseEvent::Completed(ModelFinishReason::Stop),
                ))),
                // In case this method is called after completion.
                None => Poll::Ready(Ok(None)),
            };
        }
        if this.event_idx > this.events.len() {
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(EVENT_INTERVAL)));
        Pin::new(this).poll_next_event(cx)
    }
}

struct ScriptStep {
    // Only requests whose prompt contains this text match.
    needle: Option<String>,
    response: PresetResponse,
}

#[derive(Default)]
struct ModelScript {
    steps: Vec<ScriptStep>,
    requests: Vec<ModelRequest>,
}

impl ModelScript {
    fn next_response(
        &mut self,
        req: &ModelRequest,
    ) -> Result<PresetResponse, Error> {
        self.requests.push(req.clone());
        let text = req.prompt.as_str();

        let step_idx = self
            .steps
            .iter()
            .position(|step| {
                step.needle
                    .as_deref()
                    .is_some_and(|needle| text.contains(needle))
            })
            .or_else(|| self.steps.iter().position(|s| s.needle.is_none()))
            .ok_or_else(|| {
                Error::new("no enough steps", ErrorKind::RateLimitExceeded)
            })?;

        let step = &mut self.steps[step_idx];
        match step.response.failures {
            Some(0) => Err(Error::new("preset failure", ErrorKind::Other)),
            Some(n) => {
                step.response.failures = Some(n - 1);
                if n == 1 {
                    // The next attempt succeeds.
                    step.response.failures = None;
                }
                Err(Error::new("preset failure", ErrorKind::Other))
            }
            None => Ok(self.steps.remove(step_idx).response),
        }
    }
}

/// A local fake narrative model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to a request. Steps added with
/// [`TestModelProvider::add_response_matching`] answer requests whose prompt
/// contains their needle, and take priority. The other steps
/// answer the remaining requests in the order they were added. Each step is
/// used once. If no step fits, an error will be returned.
///
/// Clones share the same script.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<ModelScript>>,
}

impl TestModelProvider {
    /// Adds a step answering the next request in order.
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.lock().steps.push(ScriptStep {
            needle: None,
            response: preset,
        });
    }

    /// Adds a step answering a request that mentions `needle`.
    #[inline]
    pub fn add_response_matching<S: Into<String>>(
        &self,
        needle: S,
        preset: PresetResponse,
    ) {
        self.lock().steps.push(ScriptStep {
            needle: Some(needle.into()),
            response: preset,
        });
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModelScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let preset = self.lock().next_response(req);
        async move {
            let preset = preset?;
            if let Some(delay) = preset.delay {
                sleep(delay).await;
            }
            Ok(TestModelResponse {
                events: preset.events,
                event_idx: 0,
                sleep: None,
            })
        }
    }
}

#[derive(Default)]
struct ImageScript {
    presets: HashMap<String, PresetImages>,
    queries: Vec<String>,
}

/// A local fake image search for testing purpose.
///
/// Queries are answered by the preset registered for that exact query, or
/// with no results when nothing is registered. Clones share the same presets.
#[derive(Clone, Default)]
pub struct TestImageProvider {
    script: Arc<Mutex<ImageScript>>,
}

impl TestImageProvider {
    /// Registers the answer for `query`.
    #[inline]
    pub fn add_images<S: Into<String>>(&self, query: S, preset: PresetImages) {
        self.lock().presets.insert(query.into(), preset);
    }

    /// Returns every query received so far.
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ImageScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageProvider for TestImageProvider {
    type Error = crate::Error;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ImageResult>, Self::Error>> + Send + 'static
    {
        let preset = {
            let mut script = self.lock();
            script.queries.push(query.to_owned());
            script.presets.get(query).cloned()
        };
        async move {
            let Some(preset) = preset else {
                return Ok(vec![]);
            };
            if let Some(delay) = preset.delay {
                sleep(delay).await;
            }
            if preset.failing {
                return Err(Error::new("preset failure", ErrorKind::Other));
            }
            Ok(preset.urls.into_iter().map(ImageResult::with_url).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use super::*;

    async fn collect_response(
        resp: TestModelResponse,
    ) -> Result<String, Error> {
        let mut resp = pin!(resp);
        let mut msg = String::new();
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await?
        {
            if let ModelResponseEvent::MessageDelta(delta) = event {
                msg.push_str(&delta);
            }
        }
        Ok(msg)
    }

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_text("Hello, world!"));
        provider.add_response_matching(
            "keywords",
            PresetResponse::with_text("dragon cave treasure"),
        );
        provider.add_response(PresetResponse::with_text("Second beat."));

        let req = ModelRequest::with_prompt("Start a story");
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(collect_response(resp).await.unwrap(), "Hello, world!");

        let req = ModelRequest::with_prompt("Give me 3 keywords");
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(
            collect_response(resp).await.unwrap(),
            "dragon cave treasure"
        );

        let req = ModelRequest::with_prompt("Continue");
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(collect_response(resp).await.unwrap(), "Second beat.");

        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert_eq!(provider.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_failures() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_text("ok").with_failures(2));
        let req = ModelRequest::with_prompt("Start");
        assert!(provider.send_request(&req).await.is_err());
        assert!(provider.send_request(&req).await.is_err());
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(collect_response(resp).await.unwrap(), "ok");

        provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Once ".to_owned()),
            PresetEvent::Error("connection reset".to_owned()),
        ]));
        let resp = provider.send_request(&req).await.unwrap();
        assert!(collect_response(resp).await.is_err());
    }

    #[tokio::test]
    async fn test_image_search() {
        let provider = TestImageProvider::default();
        provider.add_images(
            "forest path choice",
            PresetImages::with_urls(["http://img/1", "http://img/2"]),
        );
        provider.add_images("broken", PresetImages::failing());

        let results = provider.search("forest path choice").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].regular_url, "http://img/1");
        assert!(provider.search("unknown").await.unwrap().is_empty());
        assert!(provider.search("broken").await.is_err());
        assert_eq!(
            provider.queries(),
            vec!["forest path choice", "unknown", "broken"]
        );
    }
}
