//! Incremental decoding of long-lived, chunked text responses.
//!
//! Chat replies and personalised recommendations arrive as a byte stream;
//! [`consume`] turns it into a sequence of growing text snapshots so a UI
//! can render the reply before it completes.

pub mod consumer;
pub mod decoder;
pub mod envelope;

pub use consumer::{consume, StreamError, StreamState, TextStreamConsumer};
pub use decoder::Utf8StreamDecoder;
pub use envelope::unwrap_text;
