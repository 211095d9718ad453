//! An image provider backed by the Unsplash photo search API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use reqwest::{Client, Response, StatusCode, header};
use storybeat_model::{ErrorKind, ImageProvider, ImageResult, ProviderError};

pub use config::{
    DEFAULT_BASE_URL, Orientation, UnsplashConfig, UnsplashConfigBuilder,
};

/// Error type for [`UnsplashProvider`].
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

/// Unsplash image search provider.
#[derive(Clone, Debug)]
pub struct UnsplashProvider {
    client: Client,
    config: Arc<UnsplashConfig>,
}

impl UnsplashProvider {
    /// Creates a new `UnsplashProvider` with the given configuration.
    #[inline]
    pub fn new(config: UnsplashConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ImageProvider for UnsplashProvider {
    type Error = Error;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ImageResult>, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .client
            .get(self.config.search_url())
            .header("Accept-Version", "v1")
            .header(header::ACCEPT, "application/json")
            .query(&self.config.query_pairs(query))
            .send();
        let query = query.to_owned();

        async move {
            let resp = resp_fut
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let resp = check_status(resp).await?;
            let body = resp
                .json::<proto::SearchResponse>()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let results = body.into_results();
            trace!("{} photos found for {query:?}", results.len());
            Ok(results)
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
    let detail = resp
        .json::<proto::ErrorBody>()
        .await
        .map(|body| body.errors.join("; "))
        .unwrap_or_else(|_| status.to_string());
    debug!("photo search failed with {status}: {detail}");
    Err(Error::new(format!("{status}: {detail}"), kind))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answers a single connection with `response` and yields the request
    /// head it received.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0; 4096];
            // Searches are bodiless GETs.
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (base_url, server)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn provider(base_url: &str) -> UnsplashProvider {
        let config = UnsplashConfigBuilder::with_access_key("k")
            .with_base_url(base_url)
            .build();
        UnsplashProvider::new(config)
    }

    #[tokio::test]
    async fn test_search_request() {
        let (base_url, server) = serve_once(http_response(
            "200 OK",
            r#"{"total":1,"results":[{"urls":{"regular":"http://img/1"}}]}"#,
        ))
        .await;

        let results = provider(&base_url)
            .search("dragon cave & treasure")
            .await
            .unwrap();
        assert_eq!(results, vec![ImageResult::with_url("http://img/1")]);

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /search/photos?query=dragon+cave+%26+treasure\
             &orientation=landscape&content_filter=high&per_page=1\
             &client_id=k HTTP/1.1\r\n"
        ));
        assert!(request.to_ascii_lowercase().contains("accept-version: v1"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let (base_url, _server) =
            serve_once(http_response("200 OK", r#"{"results":[]}"#)).await;
        let results = provider(&base_url).search("nothing").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (base_url, _server) = serve_once(http_response(
            "429 Too Many Requests",
            r#"{"errors":["Rate Limit Exceeded"]}"#,
        ))
        .await;
        let err = provider(&base_url).search("fox").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert_eq!(
            err.message(),
            "429 Too Many Requests: Rate Limit Exceeded"
        );

        let (base_url, _server) = serve_once(http_response(
            "500 Internal Server Error",
            "not json",
        ))
        .await;
        let err = provider(&base_url).search("fox").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.message().starts_with("500 Internal Server Error"));
    }
}
