//! The request side of dispatch.
//!
//! The router only needs to know a request's method (for method filters) and its path
//! (for path-prefix mounts). Anything else is free-form: middleware can attach data to
//! [`http::Extensions`] for the handlers that run after it.

use http::request::Parts;
use http::{Method, Request};

/// A request the router can dispatch.
pub trait RouteRequest: Send {
    /// Returns the HTTP method of the request
    fn method(&self) -> &Method;

    /// Returns the path of the request, without the query string
    fn path(&self) -> &str;
}

impl<B: Send> RouteRequest for Request<B> {
    #[inline]
    fn method(&self) -> &Method {
        Request::method(self)
    }

    #[inline]
    fn path(&self) -> &str {
        self.uri().path()
    }
}

impl RouteRequest for Parts {
    #[inline]
    fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    fn path(&self) -> &str {
        self.uri.path()
    }
}
