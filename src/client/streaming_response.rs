use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::streaming::{consume, StreamError};

/// A response whose body is a live byte stream.
///
/// Unlike [`ApiRequest`](super::ApiRequest) this is not replayable: the body
/// can be consumed exactly once, and it is never retried after a refresh.
#[derive(Debug)]
pub struct StreamingResponse {
    response: reqwest::Response,
}

impl StreamingResponse {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Reads the body as UTF-8 text, handing the growing text to `on_chunk`.
    pub async fn consume<F>(self, on_chunk: F) -> Result<String, StreamError>
    where
        F: FnMut(&str),
    {
        consume(self.response.bytes_stream(), on_chunk).await
    }

    pub fn into_inner(self) -> reqwest::Response {
        self.response
    }
}
