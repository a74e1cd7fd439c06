//! Line reassembly for streamed HTTP bodies.
//!
//! Network chunks split lines (and UTF-8 sequences) at arbitrary byte
//! offsets. Both providers stream line-oriented formats, SSE for OpenAI and
//! NDJSON for Ollama, so bytes are buffered until a full line is available.

use futures::{future, stream, Stream, StreamExt};

/// Accumulates raw bytes and yields complete lines.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and drain every complete line, without the terminator.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            let text = text.trim_end_matches('\r');
            if !text.trim().is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Drain a final line that arrived without a terminator.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest);
        let text = text.trim_end_matches('\r');
        (!text.trim().is_empty()).then(|| text.to_string())
    }
}

/// Split a streamed body into lines, including an unterminated last one.
pub(crate) fn lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    bytes
        .map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(LineBuffer::default(), |buffer, item| {
            let items: Vec<Result<String, E>> = match item {
                Some(Ok(chunk)) => buffer.push(chunk.as_ref()).into_iter().map(Ok).collect(),
                Some(Err(e)) => vec![Err(e)],
                None => buffer.finish().into_iter().map(Ok).collect(),
            };
            future::ready(Some(stream::iter(items)))
        })
        .flatten()
}
