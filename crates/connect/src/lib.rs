//! An ordered middleware router.
//!
//! A [`Router`] is a list of layers. Each layer pairs a method filter with one or more
//! handlers, and [`Router::run`] walks the layers in registration order: every matching
//! layer's handlers run one after another until one of them ends the chain with a result,
//! fails, or writes the response. A failure goes to the router's single [`ErrorHandler`].
//!
//! Routers compose: [`Router::mount`] splices a copy of another router's layers at the current
//! position, optionally guarded by a path prefix or a method ([`Router::mount_at`]).
//!
//! ```
//! use http::Request;
//! use micro_connect::{handler_fn, sync_handler_fn, Flow, Router, ServerResponse};
//!
//! type Req = Request<String>;
//!
//! let router: Router<Req, ServerResponse, String> = Router::new()
//!     .use_handlers(handler_fn(|req: &mut Req, _res: &mut ServerResponse| {
//!         Box::pin(async move {
//!             let trimmed = req.body().trim().to_string();
//!             req.extensions_mut().insert(trimmed);
//!             Ok(Flow::Next)
//!         })
//!     }))
//!     .post(sync_handler_fn(|req: &mut Req, _res: &mut ServerResponse| {
//!         let body = req.extensions().get::<String>().cloned().unwrap_or_default();
//!         Ok(Flow::Done(format!("created {body}")))
//!     }));
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut req = Request::post("/users").body("  Jane ".to_string()).unwrap();
//! let outcome = router.run(&mut req, &mut ServerResponse::new()).await.unwrap();
//! assert_eq!(outcome.into_value().as_deref(), Some("created Jane"));
//! # });
//! ```
//!
//! The [`page`] and [`api`] modules adapt a router to the two ways a request is usually
//! answered: a declarative page result, or a full HTTP response.

mod error;
mod handler;
mod outcome;
mod request;
mod response;

pub mod api;
pub mod page;
pub mod router;

pub use error::{BoxError, RegistrationError, RouteError};
pub use handler::{
    BoxedHandler, DefaultErrorHandler, ErrorHandler, ErrorHandlerFn, Flow, FnHandler, Handler, HandlerResult,
    IntoHandlers, Single, SyncErrorHandlerFn, SyncFnHandler, error_handler_fn, handler_fn, sync_error_handler_fn,
    sync_handler_fn,
};
pub use outcome::Outcome;
pub use request::RouteRequest;
pub use response::{ResponseState, ServerResponse};
pub use router::{Layer, MethodFilter, Prefix, Router};
