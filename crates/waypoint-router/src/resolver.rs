//! Handler parameter resolution.
//!
//! The dispatcher does not know how a controller wants its arguments. It
//! hands a [`ParameterResolver`] the declared signatures plus a pool of
//! available values and invokes the controller with whatever comes back.

use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::error::{Result, RouterError};
use crate::request::UrlParams;

/// How a pool value is coerced before it is passed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Passed through as a JSON string.
    Text,
    /// Parsed as a signed integer.
    Integer,
    /// Parsed as a float.
    Float,
    /// Parsed from `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
    Bool,
    /// The JSON request body.
    Body,
}

impl ParamKind {
    const fn describe(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Bool => "a boolean",
            Self::Body => "a JSON body",
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl Param {
    /// Declares a parameter.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Declares a text parameter.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Text)
    }

    /// Declares an integer parameter.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    /// Declares a float parameter.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float)
    }

    /// Declares a boolean parameter.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool)
    }

    /// Declares a parameter bound to the JSON request body.
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Body)
    }

    /// Value used when the pool has nothing for this parameter.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }
}

/// An ordered parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Creates a signature from declared parameters.
    #[must_use]
    pub const fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// Named values available to the resolver.
#[derive(Debug, Clone, Default)]
pub struct ParamPool {
    values: HashMap<String, String>,
    body: Option<Value>,
}

impl ParamPool {
    /// Merges url params over query params; url params win on collision.
    #[must_use]
    pub fn merged(url_params: &UrlParams, query: &HashMap<String, String>) -> Self {
        let mut values = query.clone();
        for (key, value) in url_params.iter() {
            values.insert(key.to_string(), value.to_string());
        }
        Self { values, body: None }
    }

    /// Attaches a decoded request body.
    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Gets a named value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the decoded request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// What is being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolveTarget<'a> {
    /// Resolved controller identifier.
    pub controller: &'a str,
    /// Action name, `None` for constructor-only resolution.
    pub action: Option<&'a str>,
    /// Constructor parameters.
    pub constructor: &'a Signature,
    /// Action parameters; `None` when the action does not exist.
    pub signature: Option<&'a Signature>,
}

impl ResolveTarget<'_> {
    fn describe(&self) -> String {
        self.action.map_or_else(
            || self.controller.to_string(),
            |action| format!("{}::{action}", self.controller),
        )
    }
}

/// Resolved invocation arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArgs {
    /// Constructor arguments, in declaration order.
    pub constructor: Vec<Value>,
    /// Action arguments, in declaration order.
    pub action: Vec<Value>,
}

/// Computes ordered handler arguments from a pool of named values.
pub trait ParameterResolver: Send + Sync {
    /// Resolves constructor and action arguments for `target`.
    ///
    /// # Errors
    ///
    /// Implementations fail when a required value is missing or cannot be
    /// coerced.
    fn resolve(&self, target: &ResolveTarget<'_>, pool: &ParamPool) -> Result<ResolvedArgs>;
}

/// Resolves parameters by name, coercing each value to its declared kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredParameterResolver;

impl DeclaredParameterResolver {
    fn resolve_one(target: &ResolveTarget<'_>, param: &Param, pool: &ParamPool) -> Result<Value> {
        let found = match param.kind {
            ParamKind::Body => pool.body().cloned(),
            kind => pool
                .get(&param.name)
                .map(|raw| coerce(&param.name, raw, kind))
                .transpose()?,
        };
        found
            .or_else(|| param.default.clone())
            .ok_or_else(|| RouterError::ParameterUnresolved {
                target: target.describe(),
                parameter: param.name.clone(),
            })
    }

    fn resolve_all(
        target: &ResolveTarget<'_>,
        signature: &Signature,
        pool: &ParamPool,
    ) -> Result<Vec<Value>> {
        signature
            .params()
            .iter()
            .map(|param| Self::resolve_one(target, param, pool))
            .collect()
    }
}

impl ParameterResolver for DeclaredParameterResolver {
    fn resolve(&self, target: &ResolveTarget<'_>, pool: &ParamPool) -> Result<ResolvedArgs> {
        let constructor = Self::resolve_all(target, target.constructor, pool)?;
        let action = match target.signature {
            Some(signature) => Self::resolve_all(target, signature, pool)?,
            None => Vec::new(),
        };
        Ok(ResolvedArgs {
            constructor,
            action,
        })
    }
}

fn coerce(name: &str, raw: &str, kind: ParamKind) -> Result<Value> {
    let invalid = || RouterError::InvalidParameter {
        parameter: name.to_string(),
        value: raw.to_string(),
        expected: kind.describe(),
    };
    match kind {
        ParamKind::Text => Ok(Value::String(raw.to_string())),
        ParamKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        ParamKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        ParamKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ParamKind::Body => serde_json::from_str(raw).map_err(|_| invalid()),
    }
}
