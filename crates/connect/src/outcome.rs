use crate::error::RouteError;

/// How a dispatch ended.
#[derive(Debug)]
pub enum Outcome<T> {
    /// A handler, or the error handler, ended the chain with a value.
    Done(T),
    /// The response was written; there is no value.
    Sent,
    /// The chain ran out of matching layers without being ended.
    NotFound,
    /// A handler failed and the default error handler absorbed the error.
    ///
    /// The response status has already been set to `500 Internal Server Error`.
    Failed(RouteError),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the terminal value, if a handler produced one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Sent | Self::NotFound | Self::Failed(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::Sent => Outcome::Sent,
            Self::NotFound => Outcome::NotFound,
            Self::Failed(err) => Outcome::Failed(err),
        }
    }
}
