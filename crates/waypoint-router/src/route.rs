//! Route definitions and handler expressions.

use std::fmt;
use std::sync::Arc;

use crate::filter::Filter;
use crate::outcome::Outcome;
use crate::pattern::PathPattern;
use crate::request::{Method, Request, UrlParams};
use crate::response::Response;

/// Action used when a textual expression names only a controller.
pub const DEFAULT_ACTION: &str = "invoke";

/// Suffix tried when a controller identifier does not resolve as written.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Separator between a namespace prefix and a controller identifier.
pub const NAMESPACE_SEPARATOR: &str = "::";

type HandlerFn = dyn Fn(&mut Request, &mut Response, &[String]) -> Option<Outcome> + Send + Sync;

/// A handler that is invoked directly, without controller resolution.
///
/// It receives the request and response carriers followed by the url
/// parameters in declaration order.
#[derive(Clone)]
pub struct DirectHandler(Arc<HandlerFn>);

impl DirectHandler {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response, &[String]) -> Option<Outcome> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Invokes the handler.
    pub fn call(
        &self,
        request: &mut Request,
        response: &mut Response,
        params: &[String],
    ) -> Option<Outcome> {
        (self.0)(request, response, params)
    }
}

impl fmt::Debug for DirectHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DirectHandler(..)")
    }
}

/// What a route dispatches to.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A controller identifier and an action on it.
    Named {
        /// Controller identifier as written.
        controller: String,
        /// Action name.
        action: String,
        /// The expression as registered, for display.
        raw: String,
    },
    /// A directly invocable handler.
    Direct(DirectHandler),
}

impl Expression {
    /// Parses a `controller/action` reference.
    ///
    /// A reference without an action targets [`DEFAULT_ACTION`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parts = text.trim_start_matches('/').split('/');
        match (parts.next(), parts.next()) {
            (Some(controller), Some(action)) => Self::Named {
                controller: controller.to_string(),
                action: action.to_string(),
                raw: text.to_string(),
            },
            _ => Self::Named {
                controller: text.to_string(),
                action: DEFAULT_ACTION.to_string(),
                raw: text.to_string(),
            },
        }
    }

    /// Builds an expression from an explicit `(controller, action)` pair.
    pub fn pair(controller: impl Into<String>, action: impl Into<String>) -> Self {
        let controller = controller.into();
        let action = action.into();
        Self::Named {
            raw: format!("{controller}/{action}"),
            controller,
            action,
        }
    }

    /// Builds a direct expression from a closure.
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response, &[String]) -> Option<Outcome> + Send + Sync + 'static,
    {
        Self::Direct(DirectHandler::new(handler))
    }

    /// Returns the expression as registered.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Named { raw, .. } => raw,
            Self::Direct(_) => "<direct>",
        }
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for Expression {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<(&str, &str)> for Expression {
    fn from((controller, action): (&str, &str)) -> Self {
        Self::pair(controller, action)
    }
}

impl From<DirectHandler> for Expression {
    fn from(handler: DirectHandler) -> Self {
        Self::Direct(handler)
    }
}

/// One `(method, pattern) -> handler` binding.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: PathPattern,
    method: Method,
    expression: Expression,
    filters: Vec<Filter>,
    name: String,
    prefix: String,
    url_params: UrlParams,
    override_controller: Option<String>,
}

impl Route {
    /// Creates an anonymous GET route without filters.
    pub fn new(path: &str, expression: impl Into<Expression>) -> Self {
        Self {
            pattern: PathPattern::new(path),
            method: Method::Get,
            expression: expression.into(),
            filters: Vec::new(),
            name: String::new(),
            prefix: String::new(),
            url_params: UrlParams::new(),
            override_controller: None,
        }
    }

    /// Sets the method.
    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replaces the filter list.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    /// Appends a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the route name used for reverse lookup.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the namespace prefix of the controller identifier.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Recompiles the route under `base` (used by route groups).
    #[must_use]
    pub fn rebase(mut self, base: &str) -> Self {
        if !base.is_empty() {
            self.pattern = PathPattern::new(&format!("{base}{}", self.pattern.path()));
        }
        self
    }

    /// Returns the path as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.path()
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the parameter names in token order.
    #[must_use]
    pub fn param_keys(&self) -> &[String] {
        self.pattern.param_keys()
    }

    /// Returns the method this route is registered under.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the handler expression.
    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Returns the filters in registration order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns the route name, empty when anonymous.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the url params bound by the last match.
    #[must_use]
    pub const fn url_params(&self) -> &UrlParams {
        &self.url_params
    }

    /// Returns the direct handler, if the route has one.
    #[must_use]
    pub const fn direct_handler(&self) -> Option<&DirectHandler> {
        match &self.expression {
            Expression::Direct(handler) => Some(handler),
            Expression::Named { .. } => None,
        }
    }

    /// Returns the action name; direct routes have none.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        match &self.expression {
            Expression::Named { action, .. } => Some(action),
            Expression::Direct(_) => None,
        }
    }

    /// Returns the expression for display, qualified by the prefix.
    #[must_use]
    pub fn expression_display(&self) -> String {
        if self.prefix.is_empty() {
            self.expression.raw().to_string()
        } else {
            format!(
                "{}{NAMESPACE_SEPARATOR}{}",
                self.prefix,
                self.expression.raw()
            )
        }
    }

    /// Returns the controller identifier to resolve.
    ///
    /// This is the override when one was set, otherwise the registered
    /// controller with its first letter upper-cased, qualified by the prefix.
    /// Direct routes have no identifier.
    #[must_use]
    pub fn controller_identifier(&self) -> Option<String> {
        if let Some(id) = &self.override_controller {
            return Some(id.clone());
        }
        let Expression::Named { controller, .. } = &self.expression else {
            return None;
        };
        let name = capitalize(controller);
        if self.prefix.is_empty() {
            Some(name)
        } else {
            Some(format!("{}{NAMESPACE_SEPARATOR}{name}", self.prefix))
        }
    }

    /// Overrides the controller identifier with a resolved candidate.
    pub fn set_controller(&mut self, identifier: impl Into<String>) {
        self.override_controller = Some(identifier.into());
    }

    /// Binds captured values to the parameter keys, replacing earlier bindings.
    pub fn set_matches(&mut self, captures: Vec<String>) {
        self.url_params = UrlParams::bind(self.pattern.param_keys(), captures);
    }

    /// Matches `path` against the route pattern.
    #[must_use]
    pub fn captures(&self, path: &str, case_sensitive: bool) -> Option<Vec<String>> {
        self.pattern.captures(path, case_sensitive)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
