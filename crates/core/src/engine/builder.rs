use storybeat_model::{ImageProvider, ModelProvider};

use super::{DeltaFn, Engine, EngineEvent, EventFn};
use crate::image_client::ImageClient;
use crate::model_client::ModelClient;

/// [`Engine`] builder.
pub struct EngineBuilder {
    pub(crate) theme: String,
    pub(crate) model_client: ModelClient,
    pub(crate) image_client: ImageClient,
    pub(crate) on_event: Option<EventFn>,
    pub(crate) on_delta: Option<DeltaFn>,
}

impl EngineBuilder {
    /// Creates a new builder for a story about `theme`, told by
    /// `model_provider` and illustrated by `image_provider`.
    #[inline]
    pub fn new<S, M, I>(theme: S, model_provider: M, image_provider: I) -> Self
    where
        S: Into<String>,
        M: ModelProvider + 'static,
        I: ImageProvider + 'static,
    {
        Self {
            theme: theme.into(),
            model_client: ModelClient::new(model_provider),
            image_client: ImageClient::new(image_provider),
            on_event: None,
            on_delta: None,
        }
    }

    /// Attaches a callback to be invoked for every [`EngineEvent`].
    ///
    /// The callback runs on the engine's task and should return quickly.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(EngineEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(std::sync::Arc::new(on_event));
        self
    }

    /// Attaches a callback to be invoked with each text delta of a
    /// narrative reply while it streams.
    #[inline]
    pub fn on_delta(
        mut self,
        on_delta: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_delta = Some(std::sync::Arc::new(on_delta));
        self
    }

    /// Builds the engine.
    ///
    /// Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> Engine {
        Engine::spawn_from_builder(self)
    }
}
