use crate::handler::{BoxedHandler, Handler};
use std::sync::Arc;

/// Marker for a single handler passed to a registration call.
#[derive(Debug)]
pub enum Single {}

/// Anything a registration call accepts: one handler, or a tuple of handlers run in order.
///
/// The `Marker` parameter only keeps the implementations apart; it is always inferred.
/// There is no implementation for `()`, so a layer without handlers cannot be registered
/// this way. Dynamic lists go through [`Router::try_route`](crate::Router::try_route).
pub trait IntoHandlers<Req, Res, T, Marker> {
    fn into_handlers(self) -> Vec<BoxedHandler<Req, Res, T>>;
}

impl<H, Req, Res, T> IntoHandlers<Req, Res, T, Single> for H
where
    H: Handler<Req, Res, T> + 'static,
{
    fn into_handlers(self) -> Vec<BoxedHandler<Req, Res, T>> {
        vec![Arc::new(self) as BoxedHandler<Req, Res, T>]
    }
}

/// impl `IntoHandlers` for tuples, from 2 handlers to 8 handlers
///
/// for example, it will impl (A, B) like this:
///```text
/// impl<A, B, Req, Res, T> IntoHandlers<Req, Res, T, fn(A, B)> for (A, B)
/// where
///     A: Handler<Req, Res, T> + 'static,
///     B: Handler<Req, Res, T> + 'static,
/// {
///     fn into_handlers(self) -> Vec<BoxedHandler<Req, Res, T>> {
///         let (A, B) = self;
///         vec![Arc::new(A), Arc::new(B)]
///     }
/// }
///```
macro_rules! impl_into_handlers_for_tuple ({ $($param:ident)* } => {
    impl<$($param,)* Req, Res, T> IntoHandlers<Req, Res, T, fn($($param,)*)> for ($($param,)*)
    where
        $($param: Handler<Req, Res, T> + 'static,)*
    {
        #[allow(non_snake_case, reason = "tuple fields are bound to their type names")]
        fn into_handlers(self) -> Vec<BoxedHandler<Req, Res, T>> {
            let ($($param,)*) = self;
            vec![$(Arc::new($param) as BoxedHandler<Req, Res, T>,)*]
        }
    }
});

impl_into_handlers_for_tuple! { A B }
impl_into_handlers_for_tuple! { A B C }
impl_into_handlers_for_tuple! { A B C D }
impl_into_handlers_for_tuple! { A B C D E }
impl_into_handlers_for_tuple! { A B C D E F }
impl_into_handlers_for_tuple! { A B C D E F G }
impl_into_handlers_for_tuple! { A B C D E F G H }

#[cfg(test)]
mod tests {
    use super::IntoHandlers;
    use crate::handler::{sync_handler_fn, Flow};
    use crate::ServerResponse;
    use http::Request;

    type Req = Request<()>;

    fn count<M>(handlers: impl IntoHandlers<Req, ServerResponse, (), M>) -> usize {
        handlers.into_handlers().len()
    }

    fn next() -> impl crate::Handler<Req, ServerResponse, ()> {
        sync_handler_fn(|_req: &mut Req, _res: &mut ServerResponse| Ok(Flow::<()>::Next))
    }

    #[test]
    fn single_and_tuples_keep_their_length() {
        assert_eq!(count(next()), 1);
        assert_eq!(count((next(), next())), 2);
        assert_eq!(count((next(), next(), next())), 3);
        assert_eq!(count((next(), next(), next(), next(), next(), next(), next(), next())), 8);
    }
}
