//! Pre-dispatch filters.
//!
//! Filters run in registration order against the shared request/response
//! pair before the handler. The first filter that rejects stops the chain and
//! dispatch returns the response as the filters left it.
//!
//! # Example
//!
//! ```
//! use waypoint_router::{Filter, Request, Response};
//!
//! let require_token = Filter::from_fn(|req: &mut Request, res: &mut Response| {
//!     if req.get_header("Authorization").is_some() {
//!         return true;
//!     }
//!     res.status = 401;
//!     false
//! });
//! let tag = Filter::from_fn(|_req: &mut Request, res: &mut Response| {
//!     res.set_header("X-Filtered", "1");
//! });
//! # let _ = (require_token, tag);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::controller::ControllerRegistry;
use crate::error::{Result, RouterError};
use crate::request::Request;
use crate::response::Response;

/// Whether a filter lets the request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Continue with the next filter or the handler.
    Pass,
    /// Stop dispatch and return the current response.
    Reject,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Reject`].
    #[must_use]
    pub const fn is_reject(self) -> bool {
        matches!(self, Self::Reject)
    }
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Self::Pass
        } else {
            Self::Reject
        }
    }
}

/// A filter that returns nothing passes.
impl From<()> for Verdict {
    fn from((): ()) -> Self {
        Self::Pass
    }
}

/// A filter implemented as a type.
pub trait RequestFilter: Send + Sync {
    /// Inspects or mutates the carriers; `false` rejects the request.
    fn filter(&self, request: &mut Request, response: &mut Response) -> bool;
}

type FilterFn = dyn Fn(&mut Request, &mut Response) -> Verdict + Send + Sync;

/// A filter reference attached to a route.
#[derive(Clone)]
pub enum Filter {
    /// A closure.
    Callable(Arc<FilterFn>),
    /// A `(class, method)` pair looked up through the controller registry.
    Method {
        /// Class identifier.
        class: String,
        /// Method name.
        method: String,
    },
    /// A value implementing [`RequestFilter`].
    Instance(Arc<dyn RequestFilter>),
}

impl Filter {
    /// Wraps a closure returning `bool` or `()`.
    pub fn from_fn<F, R>(filter: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        let callable = move |req: &mut Request, res: &mut Response| -> Verdict {
            filter(req, res).into()
        };
        Self::Callable(Arc::new(callable))
    }

    /// References a filter method by class identifier and method name.
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Method {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Wraps a [`RequestFilter`] value.
    pub fn instance(filter: impl RequestFilter + 'static) -> Self {
        Self::Instance(Arc::new(filter))
    }

    /// Runs this filter.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::FilterUnresolved`] when a method reference is
    /// unknown to the registry.
    pub fn apply(
        &self,
        registry: &dyn ControllerRegistry,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<Verdict> {
        match self {
            Self::Callable(f) => Ok(f(request, response)),
            Self::Method { class, method } => {
                let filter = registry.resolve_filter(class, method).ok_or_else(|| {
                    RouterError::FilterUnresolved {
                        class: class.clone(),
                        method: method.clone(),
                    }
                })?;
                Ok(filter.filter(request, response).into())
            }
            Self::Instance(filter) => Ok(filter.filter(request, response).into()),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Filter::Callable"),
            Self::Method { class, method } => write!(f, "Filter::Method({class}::{method})"),
            Self::Instance(_) => f.write_str("Filter::Instance"),
        }
    }
}

/// Runs a route's filters in order.
pub struct FilterChain<'a> {
    filters: &'a [Filter],
    registry: &'a dyn ControllerRegistry,
}

impl<'a> FilterChain<'a> {
    /// Creates a chain over `filters`.
    #[must_use]
    pub fn new(filters: &'a [Filter], registry: &'a dyn ControllerRegistry) -> Self {
        Self { filters, registry }
    }

    /// Runs every filter until one rejects.
    ///
    /// # Errors
    ///
    /// Propagates [`RouterError::FilterUnresolved`] from method references.
    pub fn run(&self, request: &mut Request, response: &mut Response) -> Result<Verdict> {
        for (position, filter) in self.filters.iter().enumerate() {
            trace!(position, ?filter, "running filter");
            if filter.apply(self.registry, request, response)?.is_reject() {
                debug!(position, ?filter, path = %request.path, "filter rejected request");
                return Ok(Verdict::Reject);
            }
        }
        Ok(Verdict::Pass)
    }
}
