//! What a dispatch produces.

use serde_json::Value;

use crate::response::Response;

/// The result of dispatching one request.
///
/// Either the value a handler returned, or the response carrier that filters
/// and handlers wrote into.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A response carrier.
    Response(Response),
    /// A value returned by a handler.
    Value(Value),
}

impl Outcome {
    /// Picks the handler's return value when there is one, else the carrier.
    #[must_use]
    pub fn normalize(result: Option<Self>, response: Response) -> Self {
        result.unwrap_or(Self::Response(response))
    }

    /// Returns the status code when the outcome is a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(res) => Some(res.status),
            Self::Value(_) => None,
        }
    }

    /// Returns the response, if this outcome is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&Response> {
        match self {
            Self::Response(res) => Some(res),
            Self::Value(_) => None,
        }
    }

    /// Returns the handler value, if this outcome is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Response(_) => None,
        }
    }

    /// Renders the body as text.
    ///
    /// String values are returned verbatim, other values as JSON.
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        match self {
            Self::Response(res) => res.body_string(),
            Self::Value(Value::String(s)) => Some(s.clone()),
            Self::Value(value) => Some(value.to_string()),
        }
    }

    /// Converts the outcome into a response, rendering values as JSON.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Response(res) => res,
            Self::Value(value) => Response::json(&value),
        }
    }
}

impl From<Response> for Outcome {
    fn from(res: Response) -> Self {
        Self::Response(res)
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        Self::Value(Value::String(s))
    }
}

impl From<&str> for Outcome {
    fn from(s: &str) -> Self {
        Self::Value(Value::String(s.to_string()))
    }
}
