//! Request dispatch.
//!
//! The dispatcher borrows a finished [`RouteTable`] and turns a
//! `(method, path)` pair into an [`Outcome`]:
//!
//! 1. find the first matching route and bind its captures,
//! 2. resolve the controller identifier (as written, then with the
//!    `Controller` suffix, then under the configured namespace),
//! 3. build the request/response carriers and run the route's filters,
//! 4. invoke the handler with the arguments the [`ParameterResolver`]
//!    produced,
//! 5. return the handler's value, or the response carrier when it returned
//!    nothing.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::{ActionNotFoundPolicy, RouterConfig};
use crate::controller::{Controller, ControllerRegistry, Invocation};
use crate::error::{Result, RouterError};
use crate::filter::FilterChain;
use crate::outcome::Outcome;
use crate::request::{decode_path, Method, Request};
use crate::resolver::{DeclaredParameterResolver, ParamPool, ParameterResolver, ResolveTarget};
use crate::response::Response;
use crate::route::{DirectHandler, Route, CONTROLLER_SUFFIX, DEFAULT_ACTION, NAMESPACE_SEPARATOR};
use crate::table::RouteTable;

type ErrorCallback = dyn Fn(&str) -> Outcome + Send + Sync;

/// Receives the message of a not-found (404) or rejected-parameter (400)
/// outcome.
#[derive(Clone)]
pub enum ErrorHandler {
    /// A closure producing the outcome.
    Callback(Arc<ErrorCallback>),
    /// A route dispatched with the message bound to its first parameter.
    ///
    /// A route that declares no parameter still runs; the message is dropped.
    Route(Box<Route>),
}

impl ErrorHandler {
    /// Wraps a closure.
    pub fn callback<F, O>(callback: F) -> Self
    where
        F: Fn(&str) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        let handler = move |message: &str| -> Outcome { callback(message).into() };
        Self::Callback(Arc::new(handler))
    }

    /// Uses a route as the error handler.
    #[must_use]
    pub fn route(route: Route) -> Self {
        Self::Route(Box::new(route))
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("ErrorHandler::Callback"),
            Self::Route(route) => {
                write!(f, "ErrorHandler::Route({})", route.expression_display())
            }
        }
    }
}

/// Whether dispatch is serving the request itself or its error route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Primary,
    ErrorRoute,
}

enum Target {
    Direct(DirectHandler),
    Controller(Arc<dyn Controller>),
}

/// Dispatches requests against a route table.
///
/// # Example
///
/// ```
/// use waypoint_router::{Dispatcher, Expression, Method, Registry, RouteTable};
///
/// let mut table = RouteTable::new();
/// table.get(
///     "/hello/{([a-z]+):name}",
///     Expression::direct(|_req, _res, params| Some(format!("Hello, {}!", params[0]).into())),
/// );
///
/// let dispatcher = Dispatcher::new(&table, Registry::new());
/// let outcome = dispatcher.handle(Method::Get, "/hello/world").unwrap();
/// assert_eq!(outcome.body_string(), Some("Hello, world!".to_string()));
///
/// let missing = dispatcher.handle(Method::Get, "/nope").unwrap();
/// assert_eq!(missing.status(), Some(404));
/// ```
pub struct Dispatcher<'t> {
    table: &'t RouteTable,
    registry: Arc<dyn ControllerRegistry>,
    resolver: Arc<dyn ParameterResolver>,
    config: RouterConfig,
    error_handler: Option<ErrorHandler>,
}

impl<'t> Dispatcher<'t> {
    /// Creates a dispatcher with the default resolver and configuration.
    pub fn new(table: &'t RouteTable, registry: impl ControllerRegistry + 'static) -> Self {
        Self {
            table,
            registry: Arc::new(registry),
            resolver: Arc::new(DeclaredParameterResolver),
            config: RouterConfig::default(),
            error_handler: None,
        }
    }

    /// Replaces the parameter resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ParameterResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs the handler for 404 outcomes.
    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = Some(handler);
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the route table.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        self.table
    }

    /// Dispatches using the configured case sensitivity.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle_with`].
    pub fn handle(&self, method: Method, path: &str) -> Result<Outcome> {
        self.handle_with(method, path, self.config.case_sensitive)
    }

    /// Dispatches `(method, path)`.
    ///
    /// Unmatched paths and missing actions are 404 outcomes, not errors. A
    /// parameter value that fails coercion is a 400 outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ControllerUnresolved`] when no controller
    /// candidate resolves, and propagates filter resolution failures and
    /// parameters that have no value at all.
    pub fn handle_with(&self, method: Method, path: &str, case_sensitive: bool) -> Result<Outcome> {
        self.dispatch(method, path, case_sensitive, None)
    }

    /// Dispatches a caller-built request.
    ///
    /// Its query, headers and body reach filters, the handler and the
    /// parameter pool; its url params are replaced by the match.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle_with`].
    pub fn handle_request(&self, request: Request, case_sensitive: bool) -> Result<Outcome> {
        let method = request.method;
        let path = request.path.clone();
        self.dispatch(method, &path, case_sensitive, Some(request))
    }

    /// Dispatches a raw url: the query string is parsed and the path
    /// percent-decoded first.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle_with`].
    pub fn run(&self, method: Method, url: &str) -> Result<Outcome> {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (raw_path, query) = url.split_once('?').unwrap_or((url, ""));
        let path = if raw_path.is_empty() {
            "/".to_string()
        } else {
            decode_path(raw_path)
        };

        let mut request = Request::new(method, path);
        request.query = Request::parse_query_string(query);
        self.handle_request(request, self.config.case_sensitive)
    }

    fn dispatch(
        &self,
        method: Method,
        path: &str,
        case_sensitive: bool,
        request: Option<Request>,
    ) -> Result<Outcome> {
        let Some(found) = self.table.find(method, path, case_sensitive) else {
            warn!(%method, path, "no route matched");
            return self.error(&self.config.not_found_message, 404, Stage::Primary);
        };
        debug!(
            %method,
            path,
            pattern = found.route.path(),
            handler = %found.route.expression_display(),
            "dispatching"
        );
        self.run_route(found.route.clone(), found.captures, request, Stage::Primary)
    }

    fn error(&self, message: &str, status: u16, stage: Stage) -> Result<Outcome> {
        match (&self.error_handler, stage) {
            (Some(ErrorHandler::Callback(callback)), _) => Ok(callback(message)),
            (Some(ErrorHandler::Route(route)), Stage::Primary) => {
                if route.param_keys().is_empty() {
                    debug!(
                        handler = %route.expression_display(),
                        message,
                        "error route declares no parameter, message dropped"
                    );
                }
                self.run_route(
                    route.as_ref().clone(),
                    vec![message.to_string()],
                    None,
                    Stage::ErrorRoute,
                )
            }
            _ => Ok(Outcome::Response(Response::error(status, message))),
        }
    }

    fn run_route(
        &self,
        mut route: Route,
        captures: Vec<String>,
        request: Option<Request>,
        stage: Stage,
    ) -> Result<Outcome> {
        route.set_matches(captures);

        let target = match route.direct_handler().cloned() {
            Some(handler) => Target::Direct(handler),
            None => Target::Controller(self.resolve_controller(&mut route)?),
        };

        let url_params = route.url_params().clone();
        let mut request = match request {
            Some(mut request) => {
                request.url_params = url_params.clone();
                request
            }
            None => Request::from_url_params(url_params.clone()),
        };
        let mut response = Response::ok();

        let chain = FilterChain::new(route.filters(), self.registry.as_ref());
        if chain.run(&mut request, &mut response)?.is_reject() {
            return Ok(Outcome::Response(response));
        }

        match target {
            Target::Direct(handler) => {
                let result = handler.call(&mut request, &mut response, &url_params.values());
                Ok(Outcome::normalize(result, response))
            }
            Target::Controller(controller) => {
                self.invoke_controller(&route, controller.as_ref(), request, response, stage)
            }
        }
    }

    fn resolve_controller(&self, route: &mut Route) -> Result<Arc<dyn Controller>> {
        let identifier = route.controller_identifier().unwrap_or_default();
        if let Some(controller) = self.registry.resolve_controller(&identifier) {
            trace!(controller = %identifier, "controller resolved as registered");
            return Ok(controller);
        }

        let suffixed = format!("{identifier}{CONTROLLER_SUFFIX}");
        if let Some(controller) = self.registry.resolve_controller(&suffixed) {
            trace!(controller = %suffixed, "controller resolved with suffix");
            route.set_controller(suffixed);
            return Ok(controller);
        }

        let prefix = &self.config.namespace_prefix;
        if prefix.is_empty() {
            return Err(RouterError::ControllerUnresolved {
                controller: suffixed,
            });
        }

        let namespaced = format!("{prefix}{NAMESPACE_SEPARATOR}{suffixed}");
        match self.registry.resolve_controller(&namespaced) {
            Some(controller) => {
                trace!(controller = %namespaced, "controller resolved in namespace");
                route.set_controller(namespaced);
                Ok(controller)
            }
            None => Err(RouterError::ControllerUnresolved {
                controller: namespaced,
            }),
        }
    }

    fn invoke_controller(
        &self,
        route: &Route,
        controller: &dyn Controller,
        mut request: Request,
        mut response: Response,
        stage: Stage,
    ) -> Result<Outcome> {
        let identifier = route.controller_identifier().unwrap_or_default();
        let action = route.action().unwrap_or(DEFAULT_ACTION);
        let signature = controller.action(action);

        if signature.is_none() {
            warn!(controller = %identifier, action, "action not found on controller");
            let outcome = self.error(&self.config.action_not_found_message, 404, stage)?;
            if self.config.action_not_found == ActionNotFoundPolicy::Terminal {
                return Ok(outcome);
            }
        }

        let pool = ParamPool::merged(&request.url_params, &request.query)
            .with_body(request.json::<Value>().ok());
        let constructor = controller.constructor();
        let target = ResolveTarget {
            controller: &identifier,
            action: Some(action),
            constructor: &constructor,
            signature: signature.as_ref(),
        };
        let args = match self.resolver.resolve(&target, &pool) {
            Ok(args) => args,
            Err(err @ RouterError::InvalidParameter { .. }) => {
                warn!(controller = %identifier, action, error = %err, "parameter rejected");
                return self.error(&err.to_string(), 400, stage);
            }
            Err(err) => return Err(err),
        };

        let result = controller.invoke(
            action,
            Invocation {
                request: &mut request,
                response: &mut response,
                constructor: args.constructor,
                args: args.action,
            },
        );
        Ok(Outcome::normalize(result, response))
    }
}

impl fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .field("config", &self.config)
            .field("error_handler", &self.error_handler)
            .finish_non_exhaustive()
    }
}
