//! Error types of the router.
//!
//! [`RegistrationError`] is raised while layers are being registered, never during dispatch.
//! [`RouteError`] is what the dispatcher hands to the error handler when a chain fails.

use crate::router::MethodFilter;
use std::error::Error;
use thiserror::Error;

/// The error type handlers and error handlers fail with.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("at least one handler is required for a {method} layer")]
    NoHandlers { method: MethodFilter },

    #[error("invalid http method: {name}")]
    InvalidMethod {
        name: String,
        #[source]
        source: http::method::InvalidMethod,
    },
}

impl RegistrationError {
    pub fn no_handlers(method: MethodFilter) -> Self {
        Self::NoHandlers { method }
    }

    pub fn invalid_method<S: ToString>(name: S, source: http::method::InvalidMethod) -> Self {
        Self::InvalidMethod { name: name.to_string(), source }
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    /// A handler returned an error. Displays as the handler's own message.
    #[error("{source}")]
    Handler { source: BoxError, layer: usize },

    #[error("chain misuse: {reason}")]
    ChainMisuse { reason: String },
}

impl RouteError {
    pub fn handler<E: Into<BoxError>>(source: E, layer: usize) -> Self {
        Self::Handler { source: source.into(), layer }
    }

    pub fn chain_misuse<S: ToString>(reason: S) -> Self {
        Self::ChainMisuse { reason: reason.to_string() }
    }

    /// Index of the layer whose handler failed, if the error came from a handler.
    pub fn layer(&self) -> Option<usize> {
        match self {
            Self::Handler { layer, .. } => Some(*layer),
            Self::ChainMisuse { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistrationError, RouteError};
    use crate::router::MethodFilter;
    use http::Method;

    #[test]
    fn handler_error_displays_source_message() {
        let err = RouteError::handler("name is required", 2);
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.layer(), Some(2));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn chain_misuse_has_no_layer() {
        let err = RouteError::chain_misuse("advanced after termination");
        assert_eq!(err.to_string(), "chain misuse: advanced after termination");
        assert_eq!(err.layer(), None);
    }

    #[test]
    fn registration_error_names_the_method() {
        let err = RegistrationError::no_handlers(MethodFilter::Only(Method::POST));
        assert_eq!(err.to_string(), "at least one handler is required for a POST layer");

        let err = RegistrationError::no_handlers(MethodFilter::Any);
        assert_eq!(err.to_string(), "at least one handler is required for a * layer");
    }
}
