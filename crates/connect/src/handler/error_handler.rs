use crate::error::{BoxError, RouteError};
use crate::outcome::Outcome;
use crate::response::ResponseState;
use async_trait::async_trait;
use futures::future::BoxFuture;
use http::StatusCode;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Receives the failure of a chain, exactly once per failed dispatch.
///
/// An error returned from here is not handled again: it leaves [`Router::run`](crate::Router::run)
/// as its `Err`.
#[async_trait]
pub trait ErrorHandler<Req, Res, T>: Send + Sync {
    async fn handle(&self, err: RouteError, req: &mut Req, res: &mut Res) -> Result<Outcome<T>, BoxError>;
}

/// The error handler used when none is configured.
///
/// It marks the response with `500 Internal Server Error` and gives the error back as
/// [`Outcome::Failed`], so the caller can surface its message. Nothing is written to the
/// response body.
#[derive(Default, Clone, Copy, Debug)]
pub struct DefaultErrorHandler;

#[async_trait]
impl<Req, Res, T> ErrorHandler<Req, Res, T> for DefaultErrorHandler
where
    Req: Send,
    Res: ResponseState,
    T: Send,
{
    async fn handle(&self, err: RouteError, _req: &mut Req, res: &mut Res) -> Result<Outcome<T>, BoxError> {
        debug!(cause = %err, "chain failed, responding with internal server error");
        res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        Ok(Outcome::Failed(err))
    }
}

/// An async closure error handler, see [`error_handler_fn`].
pub struct ErrorHandlerFn<F, Req, Res, T> {
    f: F,
    _phantom: PhantomData<fn(&mut Req, &mut Res) -> T>,
}

pub fn error_handler_fn<F, Req, Res, T>(f: F) -> ErrorHandlerFn<F, Req, Res, T>
where
    F: for<'a> Fn(RouteError, &'a mut Req, &'a mut Res) -> BoxFuture<'a, Result<Outcome<T>, BoxError>> + Send + Sync,
{
    ErrorHandlerFn { f, _phantom: PhantomData }
}

#[async_trait]
impl<F, Req, Res, T> ErrorHandler<Req, Res, T> for ErrorHandlerFn<F, Req, Res, T>
where
    F: for<'a> Fn(RouteError, &'a mut Req, &'a mut Res) -> BoxFuture<'a, Result<Outcome<T>, BoxError>> + Send + Sync,
    Req: Send,
    Res: Send,
    T: Send,
{
    async fn handle(&self, err: RouteError, req: &mut Req, res: &mut Res) -> Result<Outcome<T>, BoxError> {
        (self.f)(err, req, res).await
    }
}

impl<F, Req, Res, T> fmt::Debug for ErrorHandlerFn<F, Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorHandlerFn { .. }")
    }
}

/// A synchronous closure error handler, see [`sync_error_handler_fn`].
pub struct SyncErrorHandlerFn<F, Req, Res, T> {
    f: F,
    _phantom: PhantomData<fn(&mut Req, &mut Res) -> T>,
}

pub fn sync_error_handler_fn<F, Req, Res, T>(f: F) -> SyncErrorHandlerFn<F, Req, Res, T>
where
    F: Fn(RouteError, &mut Req, &mut Res) -> Result<Outcome<T>, BoxError> + Send + Sync,
{
    SyncErrorHandlerFn { f, _phantom: PhantomData }
}

#[async_trait]
impl<F, Req, Res, T> ErrorHandler<Req, Res, T> for SyncErrorHandlerFn<F, Req, Res, T>
where
    F: Fn(RouteError, &mut Req, &mut Res) -> Result<Outcome<T>, BoxError> + Send + Sync,
    Req: Send,
    Res: Send,
    T: Send,
{
    async fn handle(&self, err: RouteError, req: &mut Req, res: &mut Res) -> Result<Outcome<T>, BoxError> {
        (self.f)(err, req, res)
    }
}

impl<F, Req, Res, T> fmt::Debug for SyncErrorHandlerFn<F, Req, Res, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SyncErrorHandlerFn { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultErrorHandler, ErrorHandler};
    use crate::error::RouteError;
    use crate::outcome::Outcome;
    use crate::response::{ResponseState, ServerResponse};
    use http::{Request, StatusCode};

    #[tokio::test]
    async fn default_handler_marks_response_failed() {
        let mut req = Request::new(());
        let mut res = ServerResponse::new();

        let outcome: Outcome<()> =
            DefaultErrorHandler.handle(RouteError::handler("boom", 0), &mut req, &mut res).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!res.is_sent());
        assert!(res.body().is_empty());
        match outcome {
            Outcome::Failed(err) => assert_eq!(err.to_string(), "boom"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
