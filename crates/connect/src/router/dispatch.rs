//! Dispatch of one request through a [`Router`].
//!
//! Each [`Router::run`] owns its own [`Chain`]: nothing here is shared between concurrent
//! dispatches, and the router itself is only read.

use super::Router;
use crate::error::{BoxError, RouteError};
use crate::handler::Flow;
use crate::outcome::Outcome;
use crate::request::RouteRequest;
use crate::response::ResponseState;
use tracing::{debug, trace, warn};

/// Where a dispatch stands between two handler invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainState {
    /// A handler has been invoked and has not decided yet.
    Pending,
    /// The last handler asked to continue (also the initial state).
    Advanced,
    /// The chain has ended without error.
    Terminated,
    /// A handler failed.
    Errored,
}

/// The per-dispatch cursor. Every transition is checked, so a finished chain can never run
/// another handler.
#[derive(Debug)]
pub(crate) struct Chain {
    state: ChainState,
    invoked: usize,
}

impl Chain {
    pub(crate) fn new() -> Self {
        Self { state: ChainState::Advanced, invoked: 0 }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ChainState {
        self.state
    }

    /// Number of handlers invoked so far.
    pub(crate) fn invoked(&self) -> usize {
        self.invoked
    }

    /// A handler is about to be invoked.
    pub(crate) fn enter(&mut self) -> Result<(), RouteError> {
        match self.state {
            ChainState::Advanced => {
                self.state = ChainState::Pending;
                self.invoked += 1;
                Ok(())
            }
            state => Err(RouteError::chain_misuse(format!("cannot invoke a handler while {state:?}"))),
        }
    }

    /// The running handler asked to continue.
    pub(crate) fn advance(&mut self) -> Result<(), RouteError> {
        self.transition(ChainState::Pending, ChainState::Advanced)
    }

    /// The chain ends, either from a terminal result or because nothing is left to run.
    pub(crate) fn terminate(&mut self) -> Result<(), RouteError> {
        match self.state {
            ChainState::Pending | ChainState::Advanced => {
                self.state = ChainState::Terminated;
                Ok(())
            }
            state => Err(RouteError::chain_misuse(format!("cannot terminate a chain while {state:?}"))),
        }
    }

    /// The running handler failed.
    pub(crate) fn fail(&mut self) -> Result<(), RouteError> {
        self.transition(ChainState::Pending, ChainState::Errored)
    }

    fn transition(&mut self, from: ChainState, to: ChainState) -> Result<(), RouteError> {
        if self.state != from {
            return Err(RouteError::chain_misuse(format!("cannot move to {to:?} while {:?}", self.state)));
        }
        self.state = to;
        Ok(())
    }
}

impl<Req, Res, T> Router<Req, Res, T>
where
    Req: RouteRequest,
    Res: ResponseState,
    T: Send,
{
    /// Dispatches one request.
    ///
    /// Matching layers run in registration order; within a layer, handlers run in the order
    /// they were given. The first handler that returns [`Flow::Done`] ends the dispatch with
    /// [`Outcome::Done`]. A response that has been sent ends it with [`Outcome::Sent`]
    /// before any further handler runs. If every matching handler continues,
    /// the result is [`Outcome::NotFound`].
    ///
    /// A handler error skips every remaining handler and goes to the error handler, whose
    /// result becomes the result of `run`.
    ///
    /// # Errors
    /// Only an error returned by the error handler itself.
    pub async fn run(&self, req: &mut Req, res: &mut Res) -> Result<Outcome<T>, BoxError> {
        match self.walk(req, res).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                debug!(cause = %err, "chain failed, calling error handler");
                self.error_handler.handle(err, req, res).await
            }
        }
    }

    async fn walk(&self, req: &mut Req, res: &mut Res) -> Result<Outcome<T>, RouteError> {
        let mut chain = Chain::new();

        for (index, layer) in self.layers.iter().enumerate() {
            if !layer.matches(req) {
                continue;
            }
            trace!(layer = index, method = %layer.method(), "layer matched");

            for handler in layer.handlers() {
                if res.is_sent() {
                    return Self::stop_sent(&mut chain, index);
                }

                chain.enter()?;
                match handler.call(req, res).await {
                    Ok(Flow::Next) => chain.advance()?,
                    Ok(Flow::Done(value)) => {
                        chain.terminate()?;
                        debug!(layer = index, handlers = chain.invoked(), "chain ended with a result");
                        return Ok(Outcome::Done(value));
                    }
                    Err(source) => {
                        chain.fail()?;
                        return Err(RouteError::handler(source, index));
                    }
                }
            }
        }

        if res.is_sent() {
            return Self::stop_sent(&mut chain, self.layers.len());
        }

        chain.terminate()?;
        debug!(method = %req.method(), path = req.path(), "no handler ended the chain");
        Ok(Outcome::NotFound)
    }

    fn stop_sent(chain: &mut Chain, layer: usize) -> Result<Outcome<T>, RouteError> {
        if chain.invoked() > 0 {
            warn!(layer, "a handler continued after sending the response, chain stopped");
        }
        chain.terminate()?;
        Ok(Outcome::Sent)
    }
}
