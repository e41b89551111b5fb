use std::error::Error as StdError;

use futures::{pin_mut, Stream, StreamExt};
use tracing::{debug, warn};

use super::decoder::Utf8StreamDecoder;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The body failed mid-read. Text already handed to `on_chunk` is kept
    /// in `partial` so the caller can decide whether to keep showing it.
    #[error("stream read failed after {} bytes of text: {source}", .partial.len())]
    Read {
        partial: String,
        #[source]
        source: BoxError,
    },
}

impl StreamError {
    pub fn partial_text(&self) -> &str {
        match self {
            StreamError::Read { partial, .. } => partial,
        }
    }
}

/// Progress of one streaming call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamState {
    pub accumulated: String,
    pub done: bool,
    pub last_error: Option<String>,
}

/// Decoding state machine behind [`consume`], for callers that pull the
/// chunks themselves.
#[derive(Debug, Default)]
pub struct TextStreamConsumer {
    decoder: Utf8StreamDecoder,
    state: StreamState,
}

impl TextStreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one chunk and returns the whole text decoded so far.
    pub fn feed(&mut self, chunk: &[u8]) -> &str {
        self.decoder.decode(chunk, &mut self.state.accumulated);
        &self.state.accumulated
    }

    /// Marks the end of the stream. Returns true when the final flush
    /// added text (a dangling partial character).
    pub fn finish(&mut self) -> bool {
        let before = self.state.accumulated.len();
        self.decoder.flush(&mut self.state.accumulated);
        self.state.done = true;
        self.state.accumulated.len() != before
    }

    /// Records a read failure.
    pub fn fail(&mut self, error: &dyn StdError) {
        self.state.last_error = Some(error.to_string());
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn into_state(self) -> StreamState {
        self.state
    }
}

/// Reads `body` to the end, calling `on_chunk` with the full accumulated
/// text after every chunk, and returns the final text.
///
/// Chunks are read one at a time in arrival order. The body is owned by
/// the returned future: dropping the future drops the body and releases
/// the underlying connection.
///
/// # Errors
///
/// Returns [`StreamError::Read`] with the partial text if the body yields
/// an error. The stream is not resumed.
pub async fn consume<S, B, E, F>(body: S, mut on_chunk: F) -> Result<String, StreamError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
    F: FnMut(&str),
{
    pin_mut!(body);
    let mut consumer = TextStreamConsumer::new();
    let mut chunks = 0usize;

    while let Some(next) = body.next().await {
        match next {
            Ok(chunk) => {
                chunks += 1;
                let chunk = chunk.as_ref();
                if chunk.is_empty() {
                    continue;
                }
                let before = consumer.state().accumulated.len();
                let text = consumer.feed(chunk);
                // A chunk holding only part of a character adds no text yet.
                if text.len() > before {
                    on_chunk(text);
                }
            }
            Err(e) => {
                let source: BoxError = e.into();
                consumer.fail(source.as_ref());
                warn!(
                    chunks,
                    partial_len = consumer.state().accumulated.len(),
                    "Stream read failed: {}",
                    source
                );
                return Err(StreamError::Read {
                    partial: consumer.into_state().accumulated,
                    source,
                });
            }
        }
    }

    if consumer.finish() {
        on_chunk(&consumer.state().accumulated);
    }
    debug!(
        chunks,
        text_len = consumer.state().accumulated.len(),
        "Stream completed"
    );
    Ok(consumer.into_state().accumulated)
}
