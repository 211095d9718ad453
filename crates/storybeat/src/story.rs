use std::env;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use storybeat_core::{Engine, EngineBuilder, EngineEvent};
use storybeat_model::{ImageProvider, ModelProvider};
use storybeat_openai_model::{
    OpenAIConfig, OpenAIConfigBuilder, OpenAIProvider,
};
use storybeat_unsplash::{
    UnsplashConfig, UnsplashConfigBuilder, UnsplashProvider,
};

/// A required environment variable is missing or empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigError {
    name: &'static str,
}

impl ConfigError {
    /// Returns the name of the missing variable.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} environment variable is not set", self.name)
    }
}

impl Error for ConfigError {}

/// Provider configuration of a story.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryConfig {
    /// The narrative provider.
    pub narrative: OpenAIConfig,
    /// The image provider.
    pub images: UnsplashConfig,
}

impl StoryConfig {
    /// Reads the configuration from the environment.
    ///
    /// `NARRATIVE_API_KEY` and `UNSPLASH_ACCESS_KEY` are required.
    /// `NARRATIVE_BASE_URL`, `NARRATIVE_MODEL` and `UNSPLASH_BASE_URL`
    /// override the provider defaults when set.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Empty values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError { name });

        let mut narrative =
            OpenAIConfigBuilder::with_api_key(require("NARRATIVE_API_KEY")?);
        if let Some(base_url) = get("NARRATIVE_BASE_URL") {
            narrative = narrative.with_base_url(base_url);
        }
        if let Some(model) = get("NARRATIVE_MODEL") {
            narrative = narrative.with_model(model);
        }

        let access_key = require("UNSPLASH_ACCESS_KEY")?;
        let mut images = UnsplashConfigBuilder::with_access_key(access_key);
        if let Some(base_url) = get("UNSPLASH_BASE_URL") {
            images = images.with_base_url(base_url);
        }

        let config = Self {
            narrative: narrative.build(),
            images: images.build(),
        };
        debug!("loaded story config: {config:?}");
        Ok(config)
    }
}

/// A story builder.
///
/// See [`Engine`].
pub struct StoryBuilder {
    engine_builder: EngineBuilder,
}

impl StoryBuilder {
    /// Creates a story builder backed by the OpenAI-compatible narrative
    /// provider and Unsplash.
    pub fn with_config<S: Into<String>>(theme: S, config: StoryConfig) -> Self {
        Self::with_providers(
            theme,
            OpenAIProvider::new(config.narrative),
            UnsplashProvider::new(config.images),
        )
    }

    /// Creates a story builder with custom providers.
    pub fn with_providers<S, M, I>(
        theme: S,
        model_provider: M,
        image_provider: I,
    ) -> Self
    where
        S: Into<String>,
        M: ModelProvider + 'static,
        I: ImageProvider + 'static,
    {
        let engine_builder =
            EngineBuilder::new(theme, model_provider, image_provider);
        Self { engine_builder }
    }

    /// Attaches a callback to be invoked for every engine event.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(EngineEvent) + Send + Sync + 'static,
    ) -> Self {
        self.engine_builder = self.engine_builder.on_event(on_event);
        self
    }

    /// Attaches a callback to be invoked with each streamed text delta.
    #[inline]
    pub fn on_delta(
        mut self,
        on_delta: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.engine_builder = self.engine_builder.on_delta(on_delta);
        self
    }

    /// Builds the engine. Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> Engine {
        self.engine_builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use storybeat_core::Stage;
    use storybeat_test_model::{
        PresetImages, PresetResponse, TestImageProvider, TestModelProvider,
    };
    use tokio::time::timeout;

    use super::*;

    fn lookup(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = StoryConfig::from_lookup(lookup(&[
            ("NARRATIVE_API_KEY", "sk"),
            ("NARRATIVE_MODEL", "tiny"),
            ("UNSPLASH_ACCESS_KEY", "ak"),
            ("UNSPLASH_BASE_URL", "http://localhost:9000"),
        ]))
        .unwrap();

        assert_eq!(
            config.narrative,
            OpenAIConfigBuilder::with_api_key("sk").with_model("tiny").build()
        );
        assert_eq!(
            config.images,
            UnsplashConfigBuilder::with_access_key("ak")
                .with_base_url("http://localhost:9000")
                .build()
        );
    }

    #[test]
    fn test_config_missing_keys() {
        let err = StoryConfig::from_lookup(lookup(&[(
            "UNSPLASH_ACCESS_KEY",
            "ak",
        )]))
        .unwrap_err();
        assert_eq!(err.name(), "NARRATIVE_API_KEY");

        let err = StoryConfig::from_lookup(lookup(&[
            ("NARRATIVE_API_KEY", "sk"),
            ("UNSPLASH_ACCESS_KEY", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err.name(), "UNSPLASH_ACCESS_KEY");
        assert_eq!(
            err.to_string(),
            "UNSPLASH_ACCESS_KEY environment variable is not set"
        );
    }

    #[tokio::test]
    async fn test_story_with_providers() {
        let model = TestModelProvider::default();
        model.add_response_matching(
            "Start an interactive story",
            PresetResponse::with_text("Beginning. A: go left B: go right"),
        );
        model.add_response_matching(
            "keywords",
            PresetResponse::with_text("forest path choice"),
        );
        let images = TestImageProvider::default();
        images.add_images(
            "forest path choice",
            PresetImages::with_urls(["http://img/1"]),
        );

        let engine =
            StoryBuilder::with_providers("A walk in the woods", model, images)
                .build();
        let mut rx = engine.subscribe();
        engine.start().await.unwrap();

        let snapshot = timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| {
                s.illustration_url.is_some() && s.stage == Stage::Idle
            }),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(snapshot.transcript.len(), 1);
        assert_eq!(
            snapshot.transcript[0].content(),
            "Beginning. A: go left B: go right"
        );
        assert_eq!(snapshot.illustration_url.as_deref(), Some("http://img/1"));
        assert!(!snapshot.pending);
    }
}
