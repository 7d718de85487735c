//! Handlers and how they hand control back to the dispatcher.
//!
//! A handler receives the request and the response and returns a [`Flow`]:
//! - [`Flow::Next`] passes control to the next handler of the chain,
//! - [`Flow::Done`] ends the chain with a value,
//! - an `Err` ends the chain and goes to the router's error handler.
//!
//! Handlers are usually closures wrapped by [`handler_fn`] (async) or [`sync_handler_fn`], but
//! any type can implement [`Handler`] directly.

mod error_handler;
mod into_handlers;

pub use error_handler::{
    DefaultErrorHandler, ErrorHandler, ErrorHandlerFn, SyncErrorHandlerFn, error_handler_fn, sync_error_handler_fn,
};
pub use into_handlers::{IntoHandlers, Single};

use crate::error::BoxError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// What a handler asks the dispatcher to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    /// Continue with the next handler.
    Next,
    /// End the chain with a terminal result.
    Done(T),
}

pub type HandlerResult<T> = Result<Flow<T>, BoxError>;

/// A shared, type-erased handler as stored in a layer.
pub type BoxedHandler<Req, Res, T> = Arc<dyn Handler<Req, Res, T>>;

#[async_trait]
pub trait Handler<Req, Res, T>: Send + Sync {
    async fn call(&self, req: &mut Req, res: &mut Res) -> HandlerResult<T>;
}

/// An async closure handler, see [`handler_fn`].
pub struct FnHandler<F, Req, Res, T> {
    f: F,
    _phantom: PhantomData<fn(&mut Req, &mut Res) -> T>,
}

/// Wraps an async closure as a [`Handler`].
///
/// The closure returns a boxed future borrowing the request and response:
///
/// ```
/// use micro_connect::{handler_fn, Flow, ServerResponse};
/// use http::Request;
///
/// let log_body = handler_fn(|req: &mut Request<String>, _res: &mut ServerResponse| {
///     Box::pin(async move {
///         println!("body: {}", req.body());
///         Ok::<_, micro_connect::BoxError>(Flow::<()>::Next)
///     })
/// });
/// # let _ = log_body;
/// ```
pub fn handler_fn<F, Req, Res, T>(f: F) -> FnHandler<F, Req, Res, T>
where
    F: for<'a> Fn(&'a mut Req, &'a mut Res) -> BoxFuture<'a, HandlerResult<T>> + Send + Sync,
{
    FnHandler { f, _phantom: PhantomData }
}

#[async_trait]
impl<F, Req, Res, T> Handler<Req, Res, T> for FnHandler<F, Req, Res, T>
where
    F: for<'a> Fn(&'a mut Req, &'a mut Res) -> BoxFuture<'a, HandlerResult<T>> + Send + Sync,
    Req: Send,
    Res: Send,
    T: Send,
{
    async fn call(&self, req: &mut Req, res: &mut Res) -> HandlerResult<T> {
        (self.f)(req, res).await
    }
}

impl<F, Req, Res, T> fmt::Debug for FnHandler<F, Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler { .. }")
    }
}

/// A synchronous closure handler, see [`sync_handler_fn`].
pub struct SyncFnHandler<F, Req, Res, T> {
    f: F,
    _phantom: PhantomData<fn(&mut Req, &mut Res) -> T>,
}

/// Wraps a synchronous closure as a [`Handler`].
pub fn sync_handler_fn<F, Req, Res, T>(f: F) -> SyncFnHandler<F, Req, Res, T>
where
    F: Fn(&mut Req, &mut Res) -> HandlerResult<T> + Send + Sync,
{
    SyncFnHandler { f, _phantom: PhantomData }
}

#[async_trait]
impl<F, Req, Res, T> Handler<Req, Res, T> for SyncFnHandler<F, Req, Res, T>
where
    F: Fn(&mut Req, &mut Res) -> HandlerResult<T> + Send + Sync,
    Req: Send,
    Res: Send,
    T: Send,
{
    async fn call(&self, req: &mut Req, res: &mut Res) -> HandlerResult<T> {
        (self.f)(req, res)
    }
}

impl<F, Req, Res, T> fmt::Debug for SyncFnHandler<F, Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SyncFnHandler { .. }")
    }
}
