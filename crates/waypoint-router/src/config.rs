//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What happens when a resolved controller lacks the routed action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionNotFoundPolicy {
    /// Stop and return the 404 outcome.
    #[default]
    Terminal,
    /// Report the 404 through the error handler, then invoke the controller
    /// anyway with whatever arguments can be resolved.
    FallThrough,
}

/// Settings read by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Match paths case-sensitively in [`crate::Dispatcher::handle`].
    pub case_sensitive: bool,
    /// Namespace tried as the last controller fallback.
    pub namespace_prefix: String,
    /// Body of the outcome when no route matches.
    pub not_found_message: String,
    /// Body of the outcome when the action is missing on its controller.
    pub action_not_found_message: String,
    /// Handling of missing actions.
    pub action_not_found: ActionNotFoundPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            namespace_prefix: String::new(),
            not_found_message: "Page not found".to_string(),
            action_not_found_message: "Method not found".to_string(),
            action_not_found: ActionNotFoundPolicy::Terminal,
        }
    }
}

impl RouterConfig {
    /// Parses a JSON config; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RouterError::Manifest`] when `json` is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the namespace prefix.
    #[must_use]
    pub fn namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// Sets the missing-action policy.
    #[must_use]
    pub const fn action_not_found(mut self, policy: ActionNotFoundPolicy) -> Self {
        self.action_not_found = policy;
        self
    }

    /// Sets the default case sensitivity.
    #[must_use]
    pub const fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}
