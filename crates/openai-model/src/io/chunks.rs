use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Response;

/// A chunk source failed, the message comes from the transport.
#[derive(Debug, PartialEq, Eq)]
pub struct Error(pub String);

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// An adapter for streaming byte chunks.
pub struct Chunks {
    inner: ChunkStream,
}

impl Chunks {
    pub fn from_response(response: Response) -> Self {
        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| Error(format!("{err}"))));
        Self {
            inner: Box::pin(inner),
        }
    }

    #[cfg(test)]
    pub fn from_static(chunks: &[&'static [u8]]) -> Self {
        let chunks: Vec<_> = chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk)))
            .collect();
        Self {
            inner: Box::pin(futures_util::stream::iter(chunks)),
        }
    }

    #[inline]
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        self.inner.next().await.transpose()
    }
}

impl Debug for Chunks {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunks").finish_non_exhaustive()
    }
}
