/// A request to be sent to the model provider.
///
/// Every request the story engine makes is a one-shot completion of a
/// single user prompt; the transcript is serialized into the prompt text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The user prompt.
    pub prompt: String,
}

impl ModelRequest {
    /// Creates a request that carries `prompt` as its user message.
    #[inline]
    pub fn with_prompt<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}
