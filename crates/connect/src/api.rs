//! Adapter for API routes.
//!
//! [`Router::handler`] turns a router over [`http::Request<Bytes>`] and [`ServerResponse`] into
//! an [`ApiHandler`]: a single async entry point that always produces an [`http::Response`].
//! Requests no layer answered and chains that failed are turned into responses by the
//! responders configured in [`HandlerOptions`].

use crate::error::BoxError;
use crate::outcome::Outcome;
use crate::response::{ResponseState, ServerResponse};
use crate::router::Router;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use std::fmt;
use std::sync::Arc;
use tracing::error;

type NoMatchResponder = Arc<dyn Fn(&Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync>;
type ErrorResponder = Arc<dyn Fn(BoxError, &Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync>;

/// Responders for the requests a router did not answer itself.
#[derive(Clone)]
pub struct HandlerOptions {
    on_no_match: NoMatchResponder,
    on_error: ErrorResponder,
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the responder for requests no layer ended.
    pub fn on_no_match<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.on_no_match = Arc::new(f);
        self
    }

    /// Sets the responder for failed chains.
    ///
    /// It receives the failure left once the router's error handler ran: either the error the
    /// default error handler gave back, or the error a custom error handler raised.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(BoxError, &Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.on_error = Arc::new(f);
        self
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self { on_no_match: Arc::new(default_no_match), on_error: Arc::new(default_error) }
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerOptions { .. }")
    }
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut res = ServerResponse::new();
    res.set_status(status);
    res.text(body);
    res.into_http()
}

fn default_no_match(req: &Request<Bytes>) -> Response<Full<Bytes>> {
    text_response(StatusCode::NOT_FOUND, format!("Route {} {} not found", req.method(), req.uri().path()))
}

fn default_error(err: BoxError, req: &Request<Bytes>) -> Response<Full<Bytes>> {
    error!(cause = %err, method = %req.method(), path = req.uri().path(), "api route failed");
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
}

/// A router bound to its responders, see [`Router::handler`].
#[derive(Clone, Debug)]
pub struct ApiHandler {
    router: Router<Request<Bytes>, ServerResponse, ()>,
    options: HandlerOptions,
}

impl Router<Request<Bytes>, ServerResponse, ()> {
    /// Binds this router to an API route entry point.
    pub fn handler(self, options: HandlerOptions) -> ApiHandler {
        ApiHandler { router: self, options }
    }
}

impl ApiHandler {
    pub async fn call(&self, mut req: Request<Bytes>) -> Response<Full<Bytes>> {
        let mut res = ServerResponse::new();
        match self.router.run(&mut req, &mut res).await {
            Ok(Outcome::Done(()) | Outcome::Sent) => res.into_http(),
            Ok(Outcome::NotFound) => (self.options.on_no_match)(&req),
            Ok(Outcome::Failed(err)) => (self.options.on_error)(BoxError::from(err), &req),
            Err(err) => (self.options.on_error)(err, &req),
        }
    }

    pub fn router(&self) -> &Router<Request<Bytes>, ServerResponse, ()> {
        &self.router
    }
}
