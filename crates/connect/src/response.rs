//! The response side of dispatch.
//!
//! The dispatcher reads [`ResponseState::is_sent`] before every handler so a chain can never
//! write to a response twice, and the default error handler uses
//! [`ResponseState::set_status`] to mark a failed response.
//!
//! [`ServerResponse`] is the bundled implementation: a buffered response that is turned into an
//! [`http::Response`] once dispatch has finished.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use mime::Mime;
use serde::Serialize;

static TEXT_PLAIN_UTF_8: Mime = mime::TEXT_PLAIN_UTF_8;
static APPLICATION_JSON: Mime = mime::APPLICATION_JSON;

/// A response the router can dispatch against.
pub trait ResponseState: Send {
    /// Returns true once a handler has written the response
    fn is_sent(&self) -> bool;

    /// Sets the status code of the response
    fn set_status(&mut self, status: StatusCode);
}

/// A buffered response written by handlers.
#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
}

impl ServerResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Writes the body and marks the response as sent.
    pub fn send(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.sent = true;
    }

    /// Writes a plain text body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8.as_ref()));
        self.send(body.into());
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON.as_ref()));
        self.send(body);
        Ok(())
    }

    /// Sends a redirect to `destination` with the given status code.
    pub fn redirect(&mut self, destination: &str, status: StatusCode) -> Result<(), http::header::InvalidHeaderValue> {
        let location = HeaderValue::from_str(destination)?;
        self.status = status;
        self.headers.insert(LOCATION, location);
        self.send(Bytes::new());
        Ok(())
    }

    /// Converts the buffered response into an [`http::Response`].
    pub fn into_http(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseState for ServerResponse {
    #[inline]
    fn is_sent(&self) -> bool {
        self.sent
    }

    #[inline]
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}
