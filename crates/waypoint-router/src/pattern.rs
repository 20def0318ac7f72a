//! Path pattern compilation and matching.
//!
//! A declarative path is literal text with zero or more parameter tokens of
//! the form `{<capture>:<name>}`, where `<capture>` is a parenthesized regular
//! expression and `<name>` an identifier:
//!
//! ```text
//! /users/{(\d+):id}/posts/{([a-z-]+):slug}
//! ```
//!
//! Compiling replaces every token by its capture expression and collects the
//! names in left-to-right order. Anything that does not parse as a token is
//! kept as literal text, so compilation never fails.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\([^)]+\)):([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("token grammar is a valid regex")
});

#[derive(Debug, Clone)]
enum Matcher {
    /// Anchored regex, compiled once per case mode. `groups[i]` is the capture
    /// index holding the value of `param_keys[i]`.
    Regex {
        sensitive: Regex,
        insensitive: Regex,
        groups: Vec<usize>,
    },
    /// The expression was not a valid regex; match the raw path literally.
    Literal(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    path: String,
    expression: String,
    param_keys: Vec<String>,
    matcher: Matcher,
}

impl PathPattern {
    /// Compiles a declarative path.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint_router::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/{(\\d+):id}/comments/{(\\d+):comment}");
    /// assert_eq!(pattern.expression(), "/posts/(\\d+)/comments/(\\d+)");
    /// assert_eq!(pattern.param_keys(), ["id", "comment"]);
    ///
    /// let captures = pattern.captures("/posts/42/comments/7", false).unwrap();
    /// assert_eq!(captures, ["42", "7"]);
    /// ```
    #[must_use]
    pub fn new(path: &str) -> Self {
        let mut expression = String::with_capacity(path.len());
        let mut source = String::from("^(?:");
        let mut param_keys = Vec::new();
        let mut last = 0;

        for caps in TOKEN.captures_iter(path) {
            let (Some(token), Some(capture), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let literal = &path[last..token.start()];
            expression.push_str(literal);
            expression.push_str(capture.as_str());

            source.push_str(literal);
            source.push_str(&format!(
                "(?P<{}>{})",
                group_name(param_keys.len()),
                capture.as_str()
            ));

            param_keys.push(name.as_str().to_string());
            last = token.end();
        }
        expression.push_str(&path[last..]);
        source.push_str(&path[last..]);
        source.push_str(")$");

        let matcher = match (build(&source, false), build(&source, true)) {
            (Ok(sensitive), Ok(insensitive)) => {
                let groups = (0..param_keys.len())
                    .map(|i| {
                        let wanted = group_name(i);
                        sensitive
                            .capture_names()
                            .position(|n| n == Some(wanted.as_str()))
                            .unwrap_or(0)
                    })
                    .collect();
                Matcher::Regex {
                    sensitive,
                    insensitive,
                    groups,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    path,
                    error = %e,
                    "path pattern is not a valid expression, matching literally"
                );
                param_keys.clear();
                expression = path.to_string();
                Matcher::Literal(path.to_string())
            }
        };

        Self {
            path: path.to_string(),
            expression,
            param_keys,
            matcher,
        }
    }

    /// Returns the declarative path this pattern was compiled from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the matchable expression (tokens replaced by their captures).
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns the parameter names in token order.
    #[must_use]
    pub fn param_keys(&self) -> &[String] {
        &self.param_keys
    }

    /// Whether the pattern fell back to literal matching.
    #[must_use]
    pub const fn is_literal_fallback(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }

    /// Matches `path` against the whole pattern.
    ///
    /// Returns the captured values in `param_keys` order, or `None` when the
    /// path does not match.
    #[must_use]
    pub fn captures(&self, path: &str, case_sensitive: bool) -> Option<Vec<String>> {
        match &self.matcher {
            Matcher::Regex {
                sensitive,
                insensitive,
                groups,
            } => {
                let regex = if case_sensitive {
                    sensitive
                } else {
                    insensitive
                };
                let caps = regex.captures(path)?;
                Some(
                    groups
                        .iter()
                        .map(|&i| caps.get(i).map_or_else(String::new, |m| m.as_str().into()))
                        .collect(),
                )
            }
            Matcher::Literal(literal) => {
                let hit = if case_sensitive {
                    literal == path
                } else {
                    literal.to_lowercase() == path.to_lowercase()
                };
                hit.then(Vec::new)
            }
        }
    }

    /// Returns `true` if `path` matches the pattern.
    #[must_use]
    pub fn is_match(&self, path: &str, case_sensitive: bool) -> bool {
        match &self.matcher {
            Matcher::Regex {
                sensitive,
                insensitive,
                ..
            } => {
                if case_sensitive {
                    sensitive.is_match(path)
                } else {
                    insensitive.is_match(path)
                }
            }
            Matcher::Literal(_) => self.captures(path, case_sensitive).is_some(),
        }
    }
}

fn group_name(index: usize) -> String {
    format!("wp{index}")
}

fn build(source: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
}
