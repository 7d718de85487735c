pub mod filter;

mod dispatch;

use crate::error::RegistrationError;
use crate::handler::{BoxedHandler, DefaultErrorHandler, ErrorHandler, IntoHandlers};
use crate::request::RouteRequest;
use crate::response::ResponseState;
use filter::{AllFilter, Filter, PathPrefix};
use http::Method;
use std::fmt;
use std::sync::Arc;

pub use filter::MethodFilter;

type BoxedErrorHandler<Req, Res, T> = Arc<dyn ErrorHandler<Req, Res, T>>;

/// An ordered sequence of layers, dispatched by [`Router::run`].
///
/// Registration calls append one layer each and return the router, so a whole router is
/// usually built in one expression:
///
/// ```
/// use http::Request;
/// use micro_connect::{sync_handler_fn, Flow, Router, ServerResponse};
///
/// type Req = Request<String>;
///
/// let router: Router<Req, ServerResponse, &'static str> = Router::new()
///     .get(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done("list"))))
///     .post(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done("create"))))
///     .all(sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done("fallback"))));
///
/// assert_eq!(router.len(), 3);
/// ```
///
/// The layer sequence is never modified by dispatch, so one router can serve any number of
/// concurrent [`Router::run`] calls.
pub struct Router<Req, Res, T = ()> {
    layers: Vec<Layer<Req, Res, T>>,
    error_handler: BoxedErrorHandler<Req, Res, T>,
}

/// One registered unit: a method filter, optional mount guards, and the handlers to run in order.
pub struct Layer<Req, Res, T> {
    method: MethodFilter,
    guards: AllFilter<Req>,
    handlers: Vec<BoxedHandler<Req, Res, T>>,
}

/// The condition a sub-router is mounted under, see [`Router::mount_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    Path(PathPrefix),
    Method(MethodFilter),
}

impl From<&str> for Prefix {
    fn from(path: &str) -> Self {
        Self::Path(PathPrefix::new(path))
    }
}

impl From<String> for Prefix {
    fn from(path: String) -> Self {
        Self::Path(PathPrefix::new(path))
    }
}

impl From<PathPrefix> for Prefix {
    fn from(prefix: PathPrefix) -> Self {
        Self::Path(prefix)
    }
}

impl From<Method> for Prefix {
    fn from(method: Method) -> Self {
        Self::Method(MethodFilter::Only(method))
    }
}

impl From<MethodFilter> for Prefix {
    fn from(method: MethodFilter) -> Self {
        Self::Method(method)
    }
}

macro_rules! method_layer {
    ($method:ident, $method_filter:ident) => {
        #[doc = concat!("Appends a layer that runs `handlers` for HTTP ", stringify!($method), " requests.")]
        pub fn $method<M>(self, handlers: impl IntoHandlers<Req, Res, T, M>) -> Self {
            self.push_layer(filter::$method_filter(), handlers.into_handlers())
        }
    };
}

impl<Req, Res, T> Router<Req, Res, T>
where
    Req: RouteRequest + 'static,
    Res: ResponseState + 'static,
    T: Send + 'static,
{
    /// Creates an empty router using the [`DefaultErrorHandler`].
    pub fn new() -> Self {
        Self { layers: Vec::new(), error_handler: Arc::new(DefaultErrorHandler) }
    }
}

impl<Req, Res, T> Default for Router<Req, Res, T>
where
    Req: RouteRequest + 'static,
    Res: ResponseState + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res, T> Router<Req, Res, T>
where
    Req: RouteRequest + 'static,
    Res: Send + 'static,
    T: Send + 'static,
{
    /// Creates an empty router with a custom error handler.
    ///
    /// Unlike [`Router::new`] this does not need the response to implement
    /// [`ResponseState`] for the error path, only for dispatch.
    pub fn with_error_handler(error_handler: impl ErrorHandler<Req, Res, T> + 'static) -> Self {
        Self { layers: Vec::new(), error_handler: Arc::new(error_handler) }
    }

    /// Replaces the error handler that receives failed chains.
    pub fn on_error(mut self, error_handler: impl ErrorHandler<Req, Res, T> + 'static) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    method_layer!(get, get_method);
    method_layer!(post, post_method);
    method_layer!(put, put_method);
    method_layer!(delete, delete_method);
    method_layer!(patch, patch_method);
    method_layer!(head, head_method);
    method_layer!(options, options_method);
    method_layer!(trace, trace_method);
    method_layer!(connect, connect_method);

    /// Appends a layer for an arbitrary method, including extension methods.
    pub fn on<M>(self, method: Method, handlers: impl IntoHandlers<Req, Res, T, M>) -> Self {
        self.push_layer(MethodFilter::Only(method), handlers.into_handlers())
    }

    /// Appends a layer that runs `handlers` for every method.
    pub fn all<M>(self, handlers: impl IntoHandlers<Req, Res, T, M>) -> Self {
        self.push_layer(MethodFilter::Any, handlers.into_handlers())
    }

    /// Appends method-agnostic middleware; the same as [`Router::all`].
    pub fn use_handlers<M>(self, handlers: impl IntoHandlers<Req, Res, T, M>) -> Self {
        self.all(handlers)
    }

    /// Appends a layer from a dynamic list of handlers.
    ///
    /// # Errors
    /// Returns [`RegistrationError::NoHandlers`] if `handlers` is empty.
    pub fn try_route(
        self,
        method: impl Into<MethodFilter>,
        handlers: Vec<BoxedHandler<Req, Res, T>>,
    ) -> Result<Self, RegistrationError> {
        let method = method.into();
        if handlers.is_empty() {
            return Err(RegistrationError::no_handlers(method));
        }
        Ok(self.push_layer(method, handlers))
    }

    /// Splices a copy of `sub`'s layers at the current position.
    pub fn mount(mut self, sub: &Router<Req, Res, T>) -> Self {
        self.layers.extend(sub.layers.iter().cloned());
        self
    }

    /// Splices a copy of `sub`'s layers, each guarded by `prefix`.
    ///
    /// Strings are path prefixes, [`Method`]s and [`MethodFilter`]s are method prefixes. A
    /// spliced layer runs only when the prefix matches *and* its own method filter matches.
    /// The request path is not rewritten.
    pub fn mount_at(self, prefix: impl Into<Prefix>, sub: &Router<Req, Res, T>) -> Self {
        match prefix.into() {
            Prefix::Path(path) => self.mount_when(path, sub),
            Prefix::Method(method) => self.mount_when(method, sub),
        }
    }

    /// Splices a copy of `sub`'s layers, each guarded by `filter`.
    pub fn mount_when<F: Filter<Req> + 'static>(mut self, filter: F, sub: &Router<Req, Res, T>) -> Self {
        let guard: Arc<dyn Filter<Req>> = Arc::new(filter);
        self.layers.extend(sub.layers.iter().map(|layer| {
            let mut layer = layer.clone();
            layer.guards.prepend(Arc::clone(&guard));
            layer
        }));
        self
    }

    fn push_layer(mut self, method: MethodFilter, handlers: Vec<BoxedHandler<Req, Res, T>>) -> Self {
        debug_assert!(!handlers.is_empty(), "a layer needs at least one handler");
        self.layers.push(Layer { method, guards: filter::all_filter(), handlers });
        self
    }
}

impl<Req, Res, T> Router<Req, Res, T> {
    /// Returns the layers in dispatch order
    pub fn layers(&self) -> &[Layer<Req, Res, T>] {
        &self.layers
    }

    /// Returns the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if no layer has been registered
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<Req, Res, T> Clone for Router<Req, Res, T> {
    fn clone(&self) -> Self {
        Self { layers: self.layers.clone(), error_handler: Arc::clone(&self.error_handler) }
    }
}

impl<Req, Res, T> fmt::Debug for Router<Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("layers", &self.layers).finish_non_exhaustive()
    }
}

impl<Req, Res, T> Layer<Req, Res, T> {
    /// Gets the method filter of this layer
    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    /// Gets the number of handlers of this layer
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the layer was spliced in under a guard
    pub fn is_guarded(&self) -> bool {
        !self.guards.is_empty()
    }

    pub(crate) fn handlers(&self) -> &[BoxedHandler<Req, Res, T>] {
        &self.handlers
    }
}

impl<Req: RouteRequest, Res, T> Layer<Req, Res, T> {
    /// Checks the method filter, then the mount guards.
    #[inline]
    pub fn matches(&self, req: &Req) -> bool {
        self.method.matches_method(req.method()) && self.guards.matches(req)
    }
}

impl<Req, Res, T> Clone for Layer<Req, Res, T> {
    fn clone(&self) -> Self {
        Self { method: self.method.clone(), guards: self.guards.clone(), handlers: self.handlers.clone() }
    }
}

impl<Req, Res, T> fmt::Debug for Layer<Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("method", &self.method)
            .field("guards", &self.guards.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{MethodFilter, Prefix, Router};
    use crate::error::RegistrationError;
    use crate::handler::{sync_handler_fn, BoxedHandler, Flow, Handler};
    use crate::router::filter::PathPrefix;
    use crate::ServerResponse;
    use http::{Method, Request};
    use std::sync::Arc;

    type Req = Request<()>;
    type TestRouter = Router<Req, ServerResponse, &'static str>;

    fn done(value: &'static str) -> impl Handler<Req, ServerResponse, &'static str> {
        sync_handler_fn(move |_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::Done(value)))
    }

    fn request(method: &str, uri: &str) -> Req {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[test]
    fn registration_appends_one_layer_per_call_in_order() {
        let router: TestRouter = Router::new()
            .get(done("get"))
            .post((done("parse"), done("create")))
            .on(Method::from_bytes(b"PROPFIND").unwrap(), done("propfind"))
            .all(done("fallback"))
            .head(done("head"))
            .options(done("options"))
            .trace(done("trace"))
            .connect(done("connect"));

        let layers = router.layers();
        assert_eq!(layers.len(), 8);
        assert_eq!(layers[0].method(), &MethodFilter::Only(Method::GET));
        assert_eq!(layers[1].method(), &MethodFilter::Only(Method::POST));
        assert_eq!(layers[1].handler_count(), 2);
        assert_eq!(layers[2].method().to_string(), "PROPFIND");
        assert_eq!(layers[3].method(), &MethodFilter::Any);
        assert_eq!(layers[4].method(), &MethodFilter::Only(Method::HEAD));
        assert_eq!(layers[5].method(), &MethodFilter::Only(Method::OPTIONS));
        assert_eq!(layers[6].method(), &MethodFilter::Only(Method::TRACE));
        assert_eq!(layers[7].method(), &MethodFilter::Only(Method::CONNECT));
        assert!(layers.iter().all(|layer| !layer.is_guarded()));
    }

    #[test]
    fn try_route_rejects_empty_handler_list() {
        let err = TestRouter::new().try_route(Method::PUT, Vec::new()).unwrap_err();
        match err {
            RegistrationError::NoHandlers { method } => assert_eq!(method, MethodFilter::Only(Method::PUT)),
            other @ RegistrationError::InvalidMethod { .. } => panic!("unexpected error: {other}"),
        }

        let handlers: Vec<BoxedHandler<Req, ServerResponse, &'static str>> = vec![Arc::new(done("put"))];
        let router = TestRouter::new().try_route(Method::PUT, handlers).unwrap();
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn try_route_accepts_parsed_method_names() {
        let method: MethodFilter = "all".parse().unwrap();
        let router = TestRouter::new().try_route(method, vec![Arc::new(done("any")) as BoxedHandler<_, _, _>]).unwrap();
        assert_eq!(router.layers()[0].method(), &MethodFilter::Any);
    }

    #[test]
    fn layer_matches_method_and_guards() {
        let sub: TestRouter = Router::new().post(done("create"));
        let router: TestRouter = Router::new().mount_at("/api", &sub);

        let layer = &router.layers()[0];
        assert!(layer.is_guarded());
        assert!(layer.matches(&request("POST", "/api/users")));
        assert!(layer.matches(&request("post", "/api")));
        assert!(!layer.matches(&request("GET", "/api/users")));
        assert!(!layer.matches(&request("POST", "/users")));
    }

    #[test]
    fn mount_copies_layers_at_current_position() {
        let sub: TestRouter = Router::new().get(done("sub-get")).post(done("sub-post"));
        let router: TestRouter = Router::new().get(done("before")).mount(&sub).all(done("after"));

        let methods: Vec<String> = router.layers().iter().map(|layer| layer.method().to_string()).collect();
        assert_eq!(methods, ["GET", "GET", "POST", "*"]);

        // the sub-router keeps its own layers, and growing it later leaves the parent alone
        let sub = sub.delete(done("sub-delete"));
        assert_eq!(sub.len(), 3);
        assert_eq!(router.len(), 4);
    }

    #[test]
    fn method_prefix_is_combined_with_layer_method() {
        let sub: TestRouter = Router::new().all(done("any")).get(done("get"));
        let router: TestRouter = Router::new().mount_at(Method::POST, &sub);

        let layers = router.layers();
        assert!(layers[0].matches(&request("POST", "/")));
        assert!(!layers[0].matches(&request("GET", "/")));
        // POST prefix AND GET layer can never match
        assert!(!layers[1].matches(&request("GET", "/")));
        assert!(!layers[1].matches(&request("POST", "/")));
    }

    #[test]
    fn prefix_conversions() {
        assert_eq!(Prefix::from("/users"), Prefix::Path(PathPrefix::new("/users")));
        assert_eq!(Prefix::from(Method::GET), Prefix::Method(MethodFilter::Only(Method::GET)));
        assert_eq!(Prefix::from(MethodFilter::Any), Prefix::Method(MethodFilter::Any));
    }

    #[test]
    fn clone_is_independent() {
        let base: TestRouter = Router::new().get(done("get"));
        let extended = base.clone().post(done("post"));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }
}
