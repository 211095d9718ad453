//! A narrative provider for OpenAI-compatible chat completion APIs.
//!
//! Replies are always requested as server-sent event streams, so the story
//! engine can forward text deltas while the model is still writing.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};
use storybeat_model::{ErrorKind, ModelProvider, ModelRequest, ProviderError};

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAIConfig, OpenAIConfigBuilder,
};
use io::{Chunks, Sse};
pub use response::OpenAIResponse;

/// Error type for [`OpenAIProvider`].
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

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;
    type Response = OpenAIResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(self.config.completions_url())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&openai_req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Other));
                }
            };
            let resp = check_status(resp).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype().as_str() == "event-stream")
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(OpenAIResponse::from_sse(sse))
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let kind = if status == StatusCode::TOO_MANY_REQUESTS {
        ErrorKind::RateLimitExceeded
    } else {
        ErrorKind::Other
    };
    // Prefer the server's own explanation when it sends one.
    let detail = resp
        .json::<proto::ErrorBody>()
        .await
        .map(|body| body.error.message)
        .unwrap_or_else(|_| status.to_string());
    debug!("completion request failed with {status}: {detail}");
    Err(Error::new(format!("{status}: {detail}"), kind))
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use storybeat_model::{ModelFinishReason, ModelResponse, ModelResponseEvent};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answers a single connection with `response` and yields the raw
    /// request it received.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (base_url, server)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(head_len) = text.find("\r\n\r\n") {
                let body_len = text[..head_len]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if data.len() >= head_len + 4 + body_len {
                    return text.into_owned();
                }
            }
            if n == 0 {
                return String::from_utf8_lossy(&data).into_owned();
            }
        }
    }

    fn http_response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn provider(base_url: &str) -> OpenAIProvider {
        let config = OpenAIConfigBuilder::with_api_key("sk-test")
            .with_base_url(base_url)
            .build();
        OpenAIProvider::new(config)
    }

    async fn send(base_url: &str) -> Result<OpenAIResponse, Error> {
        provider(base_url)
            .send_request(&ModelRequest::with_prompt("Theme: space"))
            .await
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (base_url, server) = serve_once(http_response(
            "429 Too Many Requests",
            "application/json",
            r#"{"error":{"message":"slow down"}}"#,
        ))
        .await;

        let err = send(&base_url).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert_eq!(err.message(), "429 Too Many Requests: slow down");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /chat/completions "));
        assert!(request.contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""stream":true"#));
    }

    #[tokio::test]
    async fn test_server_error() {
        let (base_url, _server) = serve_once(http_response(
            "500 Internal Server Error",
            "text/plain",
            "oops",
        ))
        .await;

        let err = send(&base_url).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.message().starts_with("500 Internal Server Error"));
    }

    #[tokio::test]
    async fn test_unexpected_content_type() {
        let (base_url, _server) = serve_once(http_response(
            "200 OK",
            "application/json",
            r#"{"id":"chatcmpl-1","choices":[]}"#,
        ))
        .await;

        let err = send(&base_url).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.message().contains("Unexpected content type"));
    }

    #[tokio::test]
    async fn test_event_stream() {
        let body = concat!(
            "data: {\"id\":\"c1\",\"choices\":[{\"delta\":{\"content\":\"Hi\"},",
            "\"finish_reason\":null}]}\n\n",
            "data: {\"id\":\"c1\",\"choices\":[{\"delta\":{},",
            "\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        let (base_url, _server) = serve_once(http_response(
            "200 OK",
            "text/event-stream; charset=utf-8",
            body,
        ))
        .await;

        let mut resp = pin!(send(&base_url).await.unwrap());
        let mut events = vec![];
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await.unwrap()
        {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("Hi".to_owned()),
                ModelResponseEvent::Completed(ModelFinishReason::Stop),
            ]
        );
    }
}
