//! Response carrier.

use std::collections::HashMap;

/// A response built up by filters and handlers.
///
/// Dispatch hands the same carrier to every filter and then to the handler,
/// so a handler may fill it in place and return nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates an error response carrying `message` as its body.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(status).body(message.into())
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::ok()
                .header("Content-Type", "application/json")
                .body(body),
            Err(_) => Self::error(500, "Internal Server Error"),
        }
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

    /// Sets a header in place.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    /// Replaces the body in place.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Returns the body as a string.
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let data = serde_json::json!({"name": "test"});
        let res = Response::json(&data);
        assert_eq!(res.status, 200);
        assert_eq!(
            res.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(res.body_string(), Some(r#"{"name":"test"}"#.to_string()));
    }

    #[test]
    fn test_response_error() {
        let res = Response::error(404, "Page not found");
        assert_eq!(res.status, 404);
        assert!(res.headers.is_empty());
        assert_eq!(res.body_string(), Some("Page not found".to_string()));
    }

    #[test]
    fn test_in_place_mutation() {
        let mut res = Response::default();
        res.set_header("X-Trace", "1");
        res.set_body("done");
        res.status = 201;
        assert_eq!(res, Response::new(201).header("X-Trace", "1").body("done"));
        assert_eq!(res.headers.get("X-Trace"), Some(&"1".to_string()));
        assert_eq!(res.body_string(), Some("done".to_string()));
    }
}
