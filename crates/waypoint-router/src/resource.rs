//! REST resource expansion.
//!
//! One declaration expands into the conventional five routes:
//!
//! | action   | method | path               | name              |
//! |----------|--------|--------------------|-------------------|
//! | `list`   | GET    | `rule`             | `Resource:list`   |
//! | `view`   | GET    | `rule/{(\d+):id}`  | `Resource:view`   |
//! | `create` | POST   | `rule`             | `Resource:create` |
//! | `update` | PUT    | `rule/{(\d+):id}`  | `Resource:update` |
//! | `delete` | DELETE | `rule/{(\d+):id}`  | `Resource:delete` |
//!
//! A trailing `<...>` marker on the resource identifier replaces the default
//! identity placeholder: `Post<slug>` binds `{(\d+):slug}`,
//! `Post<([a-z-]+):slug>` binds `{([a-z-]+):slug}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::request::Method;
use crate::route::Route;

/// Identity placeholder used when the resource declares none.
pub const DEFAULT_ID_PLACEHOLDER: &str = r"{(\d+):id}";

/// The conventional resource actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestAction {
    /// Collection listing.
    List,
    /// Single member.
    View,
    /// Member creation.
    Create,
    /// Member update.
    #[serde(alias = "patch")]
    Update,
    /// Member removal.
    Delete,
}

impl RestAction {
    /// All actions, in expansion order.
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::View,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    /// Action name as used in handler expressions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parses an action name. `patch` is accepted for [`RestAction::Update`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Self::List),
            "view" => Some(Self::View),
            "create" => Some(Self::Create),
            "update" | "patch" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The fixed action to method mapping.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::List | Self::View => Method::Get,
            Self::Create => Method::Post,
            Self::Update => Method::Put,
            Self::Delete => Method::Delete,
        }
    }

    /// Whether the action addresses a single member (and needs its id).
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::View | Self::Update | Self::Delete)
    }
}

impl fmt::Display for RestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method for a textual action name; unknown actions map to GET.
#[must_use]
pub fn method_for_action(action: &str) -> Method {
    RestAction::parse(action).map_or(Method::Get, RestAction::method)
}

/// A REST resource declaration.
///
/// # Example
///
/// ```
/// use waypoint_router::{Method, ResourceRoutes, RestAction};
///
/// let routes = ResourceRoutes::new("/api/posts", "App\\Http\\PostController")
///     .exclude([RestAction::Delete])
///     .into_routes();
///
/// assert_eq!(routes.len(), 4);
/// assert_eq!(routes[1].path(), "/api/posts/{(\\d+):id}");
/// assert_eq!(routes[1].name(), "PostController:view");
/// assert_eq!(routes[3].method(), Method::Put);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceRoutes {
    rule: String,
    resource: String,
    filters: Vec<Filter>,
    exclude: Vec<RestAction>,
    name: String,
}

impl ResourceRoutes {
    /// Declares a resource at `rule` served by `resource`.
    pub fn new(rule: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            resource: resource.into(),
            filters: Vec::new(),
            exclude: Vec::new(),
            name: String::new(),
        }
    }

    /// Filters attached to every generated route.
    #[must_use]
    pub fn filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    /// Actions that are not generated.
    #[must_use]
    pub fn exclude(mut self, actions: impl IntoIterator<Item = RestAction>) -> Self {
        self.exclude.extend(actions);
        self
    }

    /// Declared name of the resource. Generated route names keep the
    /// `resourceName:action` form regardless.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The declared name, empty when none was given.
    #[must_use]
    pub fn declared_name(&self) -> &str {
        &self.name
    }

    /// Short resource name: the last path segment of the identifier, without
    /// its placeholder marker.
    #[must_use]
    pub fn resource_name(&self) -> String {
        let (identifier, _) = split_marker(&self.resource);
        let normalized = identifier.replace('\\', "/");
        normalized
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// The path segment appended for member actions.
    #[must_use]
    pub fn id_placeholder(&self) -> String {
        match split_marker(&self.resource).1 {
            Some(inner) => placeholder_token(inner),
            None => DEFAULT_ID_PLACEHOLDER.to_string(),
        }
    }

    /// The base rule with any literal marker occurrence removed.
    #[must_use]
    pub fn base_rule(&self) -> String {
        match split_marker(&self.resource).1 {
            Some(inner) => self.rule.replace(&format!("<{inner}>"), ""),
            None => self.rule.clone(),
        }
    }

    /// Expands the declaration into routes, in [`RestAction::ALL`] order.
    #[must_use]
    pub fn into_routes(self) -> Vec<Route> {
        let resource_name = self.resource_name();
        let placeholder = self.id_placeholder();
        let rule = self.base_rule();

        RestAction::ALL
            .into_iter()
            .filter(|action| !self.exclude.contains(action))
            .map(|action| {
                let path = if action.is_member() {
                    format!("{rule}/{placeholder}")
                } else {
                    rule.clone()
                };
                Route::new(&path, format!("{resource_name}/{action}"))
                    .with_method(action.method())
                    .with_filters(self.filters.clone())
                    .with_name(format!("{resource_name}:{action}"))
            })
            .collect()
    }
}

/// Splits a trailing `<...>` marker off `resource`.
///
/// The marker opens at the first `<` after the last `>` preceding the final
/// character, so the inner text never contains `>`.
fn split_marker(resource: &str) -> (&str, Option<&str>) {
    let Some(stripped) = resource.strip_suffix('>') else {
        return (resource, None);
    };
    let floor = stripped.rfind('>').map_or(0, |i| i + 1);
    match stripped[floor..].find('<') {
        Some(offset) => {
            let open = floor + offset;
            let inner = &stripped[open + 1..];
            if inner.is_empty() {
                (resource, None)
            } else {
                (&resource[..open], Some(inner))
            }
        }
        None => (resource, None),
    }
}

fn placeholder_token(inner: &str) -> String {
    if inner.starts_with('{') && inner.ends_with('}') {
        inner.to_string()
    } else if inner.contains(':') {
        format!("{{{inner}}}")
    } else {
        format!(r"{{(\d+):{inner}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handlers(routes: &[Route]) -> Vec<String> {
        routes.iter().map(Route::expression_display).collect()
    }

    #[test]
    fn test_full_expansion() {
        let routes = ResourceRoutes::new("/r", "Resource").into_routes();
        assert_eq!(routes.len(), 5);
        assert_eq!(
            routes.iter().map(Route::method).collect::<Vec<_>>(),
            [Method::Get, Method::Get, Method::Post, Method::Put, Method::Delete]
        );
        assert_eq!(
            handlers(&routes),
            [
                "Resource/list",
                "Resource/view",
                "Resource/create",
                "Resource/update",
                "Resource/delete"
            ]
        );
        assert_eq!(routes[0].path(), "/r");
        assert_eq!(routes[1].path(), "/r/{(\\d+):id}");
        assert_eq!(routes[2].path(), "/r");
        assert_eq!(routes[4].name(), "Resource:delete");
    }

    #[test]
    fn test_exclusion() {
        let routes = ResourceRoutes::new("/r", "Resource")
            .exclude([RestAction::Create])
            .into_routes();
        assert_eq!(routes.len(), 4);
        assert!(!handlers(&routes).contains(&"Resource/create".to_string()));
    }

    #[test]
    fn test_exclude_everything() {
        let routes = ResourceRoutes::new("/r", "Resource")
            .exclude(RestAction::ALL)
            .into_routes();
        assert!(routes.is_empty());
    }

    #[test]
    fn test_resource_name_from_namespaced_identifier() {
        let res = ResourceRoutes::new("/r", "App\\Http\\Controllers\\PhotoController");
        assert_eq!(res.resource_name(), "PhotoController");
        let res = ResourceRoutes::new("/r", "app/photos");
        assert_eq!(res.resource_name(), "photos");
    }

    #[test]
    fn test_capture_marker() {
        let res = ResourceRoutes::new("/articles<(\\d+):slug>", "ResourceController<(\\d+):slug>");
        assert_eq!(res.resource_name(), "ResourceController");
        assert_eq!(res.id_placeholder(), "{(\\d+):slug}");
        assert_eq!(res.base_rule(), "/articles");

        let routes = res.into_routes();
        assert_eq!(routes[1].path(), "/articles/{(\\d+):slug}");
        assert_eq!(routes[1].param_keys(), ["slug"]);
        assert_eq!(routes[3].param_keys(), ["slug"]);
        assert_eq!(routes[1].expression_display(), "ResourceController/view");
    }

    #[test]
    fn test_bare_and_braced_markers() {
        let bare = ResourceRoutes::new("/p", "Post<slug>");
        assert_eq!(bare.id_placeholder(), "{(\\d+):slug}");

        let braced = ResourceRoutes::new("/p", "Post<{([a-z-]+):slug}>");
        assert_eq!(braced.id_placeholder(), "{([a-z-]+):slug}");
        assert_eq!(braced.resource_name(), "Post");
    }

    #[test]
    fn test_custom_name_keeps_resource_route_names() {
        let res = ResourceRoutes::new("/r", "Resource").name("res");
        assert_eq!(res.declared_name(), "res");

        let routes = res.into_routes();
        assert_eq!(routes[0].name(), "Resource:list");
        assert_eq!(routes[4].name(), "Resource:delete");
        assert_eq!(routes[0].expression_display(), "Resource/list");
    }

    #[test]
    fn test_action_method_table() {
        assert_eq!(method_for_action("create"), Method::Post);
        assert_eq!(method_for_action("patch"), Method::Put);
        assert_eq!(method_for_action("archive"), Method::Get);
        assert_eq!(RestAction::parse("nope"), None);
    }

    #[test]
    fn test_filters_are_copied_to_every_route() {
        let routes = ResourceRoutes::new("/r", "Resource")
            .filters(vec![Filter::method("Auth", "check")])
            .into_routes();
        assert!(routes.iter().all(|r| r.filters().len() == 1));
    }
}
