//! Request carrier and HTTP methods.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP methods a route table is keyed by.
///
/// Anything outside the five routable verbs lands in [`Method::Other`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    /// GET method
    #[default]
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// Any other method (HEAD, OPTIONS, ...)
    Other,
}

impl Method {
    /// The methods with a dedicated route list, in table order.
    pub const ALL: [Self; 6] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Other,
    ];

    /// Parses a method name, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }

    /// Returns the method as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other => "OTHER",
        }
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Method {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Url parameters bound from a route match, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    params: Vec<(String, String)>,
}

impl UrlParams {
    /// Creates new empty url params.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `keys` with `values` positionally.
    ///
    /// Extra values beyond the last key are dropped.
    #[must_use]
    pub fn bind(keys: &[String], values: Vec<String>) -> Self {
        Self {
            params: keys.iter().cloned().zip(values).collect(),
        }
    }

    /// Inserts a parameter, replacing an existing value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a parameter as a specific type.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the values in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.params.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Returns an iterator over the parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameter is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A request as seen by filters and handlers.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path (decoded, without query string).
    pub path: String,
    /// Parameters bound from the matched route.
    pub url_params: UrlParams,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Creates a request that only carries url params.
    #[must_use]
    pub fn from_url_params(url_params: UrlParams) -> Self {
        Self {
            url_params,
            ..Self::default()
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Gets a header value.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    #[must_use]
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Gets a url parameter.
    #[must_use]
    pub fn url_param(&self, key: &str) -> Option<&str> {
        self.url_params.get(key)
    }

    /// Returns the body as a string.
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON for `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parses query parameters from a query string.
    #[must_use]
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                Some((decode_component(key, true), decode_component(value, true)))
            })
            .collect()
    }
}

/// Percent-decodes a url path. `+` is kept as is.
#[must_use]
pub fn decode_path(path: &str) -> String {
    decode_component(path, false)
}

fn decode_component(s: &str, plus_is_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let byte = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = byte {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' if plus_is_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("Patch"), Method::Patch);
        assert_eq!(Method::parse("OPTIONS"), Method::Other);
        assert_eq!(Method::parse("HEAD"), Method::Other);
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(method, Method::Delete);
        assert_eq!(serde_json::to_string(&Method::Put).unwrap(), "\"PUT\"");
    }

    #[test]
    fn test_url_params_keep_order() {
        let keys = vec!["b".to_string(), "a".to_string()];
        let params = UrlParams::bind(&keys, vec!["2".to_string(), "1".to_string()]);
        assert_eq!(params.values(), ["2", "1"]);
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.parse::<i64>("b"), Some(2));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_url_params_insert_replaces() {
        let mut params = UrlParams::new();
        params.insert("id", "1");
        params.insert("id", "2");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("2"));
    }

    #[test]
    fn test_request_builder() {
        let req = Request::get("/users")
            .header("Content-Type", "application/json")
            .query_param("page", "1");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/users");
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        assert_eq!(req.get_query("page"), Some("1"));
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Request::parse_query_string("name=John+Doe&age=30&city=New%20York&&flag");
        assert_eq!(query.get("name"), Some(&"John Doe".to_string()));
        assert_eq!(query.get("age"), Some(&"30".to_string()));
        assert_eq!(query.get("city"), Some(&"New York".to_string()));
        assert_eq!(query.get("flag"), Some(&String::new()));
        assert_eq!(query.len(), 4);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/caf%C3%A9/a+b"), "/café/a+b");
        assert_eq!(decode_path("/100%"), "/100%");
        assert_eq!(decode_path("/bad%zz"), "/bad%zz");
    }
}
