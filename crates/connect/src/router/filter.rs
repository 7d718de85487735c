//! Layer guards: composable predicates deciding whether a layer takes part in a dispatch.
//!
//! Every layer carries a [`MethodFilter`]. Mounting a sub-router adds further guards to each
//! spliced layer (a [`PathPrefix`], another [`MethodFilter`], or any [`Filter`]), combined with
//! AND logic through [`AllFilter`].
//!
//! ## Thread Safety
//!
//! All filters must implement the `Filter` trait, which requires `Send + Sync`, so a router can
//! be shared between concurrent dispatches.
//!
//! # Examples
//!
//! ```
//! use http::{Method, Request};
//! use micro_connect::router::filter::{all_filter, fn_filter, Filter, MethodFilter, PathPrefix};
//!
//! let mut guards = all_filter::<Request<()>>();
//! guards
//!     .and(PathPrefix::new("/api"))
//!     .and(MethodFilter::Only(Method::POST))
//!     .and(fn_filter(|req: &Request<()>| req.headers().contains_key("x-token")));
//!
//! let req = Request::post("/api/users").header("x-token", "t").body(()).unwrap();
//! assert!(guards.matches(&req));
//! ```

use crate::error::RegistrationError;
use crate::request::RouteRequest;
use http::Method;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Core trait for layer guards.
pub trait Filter<Req>: Send + Sync {
    /// Check if the request matches this filter's criteria.
    fn matches(&self, req: &Req) -> bool;
}

/// A filter that wraps a closure.
struct FnFilter<F>(F);

impl<Req, F: Fn(&Req) -> bool + Send + Sync> Filter<Req> for FnFilter<F> {
    fn matches(&self, req: &Req) -> bool {
        (self.0)(req)
    }
}

/// Creates a new filter from a closure.
pub fn fn_filter<Req, F>(f: F) -> impl Filter<Req>
where
    F: Fn(&Req) -> bool + Send + Sync,
{
    FnFilter(f)
}

/// Creates a new AND-composed filter chain.
pub fn all_filter<Req>() -> AllFilter<Req> {
    AllFilter::new()
}

/// Compose filters with AND logic.
///
/// All inner filters must succeed for the whole filter to succeed.
/// An empty filter chain returns true by default.
///
/// Cloning shares the inner filters, so a spliced layer can reuse its source's guards.
pub struct AllFilter<Req> {
    filters: Vec<Arc<dyn Filter<Req>>>,
}

impl<Req> AllFilter<Req> {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a new filter to the AND chain.
    pub fn and<F: Filter<Req> + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Put `filter` in front of the chain, so it is checked first.
    pub(crate) fn prepend(&mut self, filter: Arc<dyn Filter<Req>>) {
        self.filters.insert(0, filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<Req> Clone for AllFilter<Req> {
    fn clone(&self) -> Self {
        Self { filters: self.filters.clone() }
    }
}

impl<Req> fmt::Debug for AllFilter<Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllFilter").field("filters", &self.filters.len()).finish()
    }
}

impl<Req> Filter<Req> for AllFilter<Req> {
    fn matches(&self, req: &Req) -> bool {
        self.filters.iter().all(|filter| filter.matches(req))
    }
}

/// The method condition of a layer: a single method, or any method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    /// Matches `method` against this filter, ignoring ASCII case.
    #[inline]
    pub fn matches_method(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => expected.as_str().eq_ignore_ascii_case(method.as_str()),
        }
    }
}

impl<Req: RouteRequest> Filter<Req> for MethodFilter {
    #[inline]
    fn matches(&self, req: &Req) -> bool {
        self.matches_method(req.method())
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        Self::Only(method)
    }
}

/// Parses a method name. `*` and `ALL` (any case) mean any method.
impl FromStr for MethodFilter {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" || s.eq_ignore_ascii_case("all") {
            return Ok(Self::Any);
        }

        let upper = s.to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes()).map(Self::Only).map_err(|e| RegistrationError::invalid_method(s, e))
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(method) => f.write_str(method.as_str()),
        }
    }
}

macro_rules! method_filter {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Creates a filter that matches HTTP ", stringify!($upper_case_method), " requests.")]
        #[inline]
        pub fn $method() -> MethodFilter {
            MethodFilter::Only(Method::$upper_case_method)
        }
    };
}

method_filter!(get_method, GET);
method_filter!(post_method, POST);
method_filter!(put_method, PUT);
method_filter!(delete_method, DELETE);
method_filter!(head_method, HEAD);
method_filter!(options_method, OPTIONS);
method_filter!(connect_method, CONNECT);
method_filter!(patch_method, PATCH);
method_filter!(trace_method, TRACE);

/// Matches requests whose path lies under a prefix, segment by segment.
///
/// `/api` matches `/api` and `/api/users`, but not `/apiary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix(String);

impl PathPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            Self(String::from("/"))
        } else if trimmed.starts_with('/') {
            Self(trimmed.to_owned())
        } else {
            Self(format!("/{trimmed}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches_path(&self, path: &str) -> bool {
        if self.0 == "/" {
            return true;
        }

        match path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl<Req: RouteRequest> Filter<Req> for PathPrefix {
    #[inline]
    fn matches(&self, req: &Req) -> bool {
        self.matches_path(req.path())
    }
}
