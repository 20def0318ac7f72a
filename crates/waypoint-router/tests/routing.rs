//! Tests for route registration, matching and reverse lookup.

mod common;
use common::*;

use waypoint_router::{Method, PathPattern, ResourceRoutes, RestAction, Route, RouteTable};

#[test]
fn reverse_lookup_returns_registered_path() {
    let paths = [
        ("/", "home"),
        ("/about", "about"),
        ("/users/{(\\d+):id}", "user"),
        ("/a/{(\\w+):x}/b/{(\\d+):y}", "nested"),
    ];
    let mut table = RouteTable::new();
    for (path, name) in paths {
        table.register(path, "page/show", Method::Get, vec![], name);
    }
    for (path, name) in paths {
        assert_eq!(
            table.reverse_lookup(name, Method::Get, &[]),
            Some(path.to_string())
        );
    }
}

#[test]
fn reverse_lookup_is_per_method() {
    let mut table = RouteTable::new();
    table.register("/users", "users/create", Method::Post, vec![], "users");
    assert_eq!(table.reverse_lookup("users", Method::Get, &[]), None);
    assert_eq!(
        table.reverse_lookup("users", Method::Post, &["7", "edit"]),
        Some("/users/7/edit".to_string())
    );
}

#[test]
fn param_keys_follow_token_order() {
    let pattern = PathPattern::new("/{(\\d+):year}/{(\\d+):month}/{([a-z-]+):slug}");
    assert_eq!(pattern.param_keys(), ["year", "month", "slug"]);
    assert_eq!(
        pattern.captures("/2024/05/spring-notes", false),
        Some(vec![
            "2024".to_string(),
            "05".to_string(),
            "spring-notes".to_string()
        ])
    );
}

#[test]
fn literal_groups_do_not_shift_binding() {
    let pattern = PathPattern::new("/(en|fr)/files/{([a-z]+):name}/{(\\d+):rev}");
    assert_eq!(pattern.param_keys(), ["name", "rev"]);
    assert_eq!(
        pattern.captures("/fr/files/abba/3", false),
        Some(vec!["abba".to_string(), "3".to_string()])
    );
}

#[test]
fn malformed_tokens_stay_literal() {
    let pattern = PathPattern::new("/x/{id}");
    assert!(pattern.param_keys().is_empty());
    assert!(pattern.is_match("/x/{id}", true));
    assert!(!pattern.is_match("/x/5", true));
}

#[test]
fn resource_expands_to_five_routes() {
    let routes = ResourceRoutes::new("/r", "Resource").into_routes();
    let shape: Vec<_> = routes
        .iter()
        .map(|r| (r.method(), r.expression_display()))
        .collect();
    assert_eq!(
        shape,
        [
            (Method::Get, "Resource/list".to_string()),
            (Method::Get, "Resource/view".to_string()),
            (Method::Post, "Resource/create".to_string()),
            (Method::Put, "Resource/update".to_string()),
            (Method::Delete, "Resource/delete".to_string()),
        ]
    );
}

#[test]
fn resource_exclusion_drops_only_that_action() {
    let routes = ResourceRoutes::new("/r", "Resource")
        .exclude([RestAction::Create])
        .into_routes();
    assert_eq!(routes.len(), 4);
    assert!(routes
        .iter()
        .all(|r| r.expression_display() != "Resource/create"));
}

#[test]
fn resource_member_routes_require_digits() {
    let mut table = RouteTable::new();
    table.register_resource(ResourceRoutes::new("/r", "Resource"));

    assert!(table.find(Method::Get, "/r/abc", false).is_none());
    assert!(table.find(Method::Put, "/r/1a", false).is_none());
    assert!(table.find(Method::Get, "/r/17", false).is_some());

    let outcome = dispatch(&table, Method::Get, "/r/abc");
    assert_eq!(outcome.status(), Some(404));
    assert_eq!(outcome.body_string(), Some("Page not found".to_string()));
}

#[test]
fn resource_route_names_ignore_custom_name() {
    let mut table = RouteTable::new();
    table.register_resource(ResourceRoutes::new("/r", "Resource").name("res"));

    assert_eq!(
        table.reverse_lookup("Resource:list", Method::Get, &[]),
        Some("/r".to_string())
    );
    assert_eq!(
        table.reverse_lookup("Resource:update", Method::Put, &[]),
        Some("/r/{(\\d+):id}".to_string())
    );
    assert_eq!(table.reverse_lookup("res:list", Method::Get, &[]), None);
}

#[test]
fn resource_marker_renames_identity_capture() {
    let mut table = RouteTable::new();
    table.register_resource(ResourceRoutes::new(
        "/articles<(\\d+):slug>",
        "ResourceController<(\\d+):slug>",
    ));

    for method in [Method::Get, Method::Put, Method::Delete] {
        let found = table.find(method, "/articles/12", false).unwrap();
        assert_eq!(found.route.param_keys(), ["slug"]);
        assert_eq!(found.captures, ["12"]);
    }
    let list = table.find(Method::Get, "/articles", false).unwrap();
    assert_eq!(list.route.expression_display(), "ResourceController/list");
}

#[test]
fn overlapping_patterns_first_registered_wins() {
    let mut table = RouteTable::new();
    table
        .get("/posts/{(.+):slug}", "posts/bySlug")
        .get("/posts/{(\\d+):id}", "posts/view");

    let outcome = dispatch(&table, Method::Get, "/posts/42");
    assert_eq!(
        outcome.as_value(),
        Some(&serde_json::json!({ "action": "bySlug", "args": ["42"] }))
    );
}

#[test]
fn case_insensitive_by_default() {
    let mut table = RouteTable::new();
    table.add_route(Route::new("/Foo", "greeter/hello"));
    assert!(table.find(Method::Get, "/foo", false).is_some());
    assert!(table.find(Method::Get, "/foo", true).is_none());
    assert!(table.find(Method::Get, "/Foo", true).is_some());
}

#[test]
fn anchored_matching() {
    let mut table = RouteTable::new();
    table.get("/users", "users/list");
    assert!(table.find(Method::Get, "/users/extra", false).is_none());
    assert!(table.find(Method::Get, "/prefix/users", false).is_none());
}
