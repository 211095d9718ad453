use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
    InvalidPayload,
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is surfaced. Comment lines (keep-alives) and the
/// other standard fields are skipped, and multi-line data is joined with
/// line feeds.
#[derive(Debug)]
pub struct Sse {
    buf: String,
    // Bytes of a multibyte character split across two chunks.
    pending_bytes: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: String::new(),
            pending_bytes: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(event) = self.try_parse_event()? {
                return Ok(Some(event));
            }

            let Some(bytes) =
                self.chunks.next_chunk().await.map_err(Error::ChunksError)?
            else {
                // The stream may end without the final blank line.
                let rest = std::mem::take(&mut self.buf);
                return Ok(parse_block(rest.trim_end_matches(['\r', '\n'])));
            };
            self.push_bytes(&bytes)?;
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.pending_bytes.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending_bytes) {
            Ok(s) => {
                self.buf.push_str(s);
                self.pending_bytes.clear();
            }
            Err(err) if err.error_len().is_none() => {
                // Incomplete trailing character, keep it for the next chunk.
                let valid = err.valid_up_to();
                let s = std::str::from_utf8(&self.pending_bytes[..valid])
                    .map_err(|_| Error::InvalidPayload)?;
                self.buf.push_str(s);
                self.pending_bytes.drain(..valid);
            }
            Err(_) => return Err(Error::InvalidPayload),
        }
        if self.buf.contains('\r') {
            self.buf = self.buf.replace("\r\n", "\n");
        }
        Ok(())
    }

    fn try_parse_event(&mut self) -> Result<Option<String>, Error> {
        // Blocks without a data field (e.g. a lone keep-alive comment) do
        // not produce events, keep looking for the next block.
        while let Some(eol_idx) = self.buf.find("\n\n") {
            let block: String = self.buf.drain(..eol_idx + 2).collect();
            if let Some(data) = parse_block(&block[..eol_idx]) {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}

fn parse_block(block: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        if name != "data" {
            continue;
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    data
}
