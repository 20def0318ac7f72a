//! Tests for loading route manifests from disk and dispatching through them.

mod common;
use common::*;

use std::io::Write;

use serde_json::json;
use waypoint_router::{Dispatcher, Manifest, Method, RouterError};

const MANIFEST: &str = r#"{
    "config": { "namespace_prefix": "Blog", "not_found_message": "No such page" },
    "routes": [
        { "path": "/hello/{([a-z]+):name}", "handler": "greeter/hello", "name": "hello" },
        {
            "path": "/latest",
            "handler": ["posts", "list"],
            "filters": [{ "class": "Auth", "method": "check" }]
        }
    ],
    "resources": [
        {
            "path": "/posts<([a-z-]+):slug>",
            "resource": "Posts<([a-z-]+):slug>",
            "exclude": ["create", "update", "delete"]
        }
    ]
}"#;

fn write_manifest(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write manifest");
    file
}

#[test]
fn load_and_dispatch() {
    let file = write_manifest(MANIFEST);
    let manifest = Manifest::load(file.path()).unwrap();
    let table = manifest.build_table();
    assert_eq!(table.len(), 4);

    let dispatcher = Dispatcher::new(&table, registry()).with_config(manifest.config.clone());

    let outcome = dispatcher.handle(Method::Get, "/hello/grace").unwrap();
    assert_eq!(outcome.body_string(), Some("Hello, grace".to_string()));

    let outcome = dispatcher.handle(Method::Get, "/nowhere").unwrap();
    assert_eq!(outcome.status(), Some(404));
    assert_eq!(outcome.body_string(), Some("No such page".to_string()));

    assert_eq!(
        table.reverse_lookup("hello", Method::Get, &["extra"]),
        Some("/hello/{([a-z]+):name}/extra".to_string())
    );
}

#[test]
fn resource_marker_from_manifest() {
    let manifest = Manifest::from_json(MANIFEST).unwrap();
    let table = manifest.build_table();
    let dispatcher = Dispatcher::new(&table, registry());

    let found = table.find(Method::Get, "/posts/first-post", false).unwrap();
    assert_eq!(found.route.param_keys(), ["slug"]);

    let err = dispatcher.handle(Method::Get, "/posts/first-post").unwrap_err();
    assert!(matches!(
        err,
        RouterError::ParameterUnresolved { ref parameter, .. } if parameter == "id"
    ));
}

#[test]
fn manifest_filters_resolve_through_the_registry() {
    let table = Manifest::from_json(MANIFEST).unwrap().build_table();

    let err = Dispatcher::new(&table, registry())
        .handle(Method::Get, "/latest")
        .unwrap_err();
    assert!(matches!(err, RouterError::FilterUnresolved { .. }));

    let registry = registry().filter("Auth", "check", AllowAll);
    let outcome = Dispatcher::new(&table, registry)
        .handle(Method::Get, "/latest")
        .unwrap();
    assert_eq!(outcome.as_value(), Some(&json!({ "action": "list", "args": [1] })));
}

#[test]
fn malformed_manifest() {
    let file = write_manifest(r#"{ "routes": [ { "path": "/x" } ] }"#);
    let err = Manifest::load(file.path()).unwrap_err();
    assert!(matches!(err, RouterError::Manifest(_)));
}

struct AllowAll;

impl waypoint_router::RequestFilter for AllowAll {
    fn filter(
        &self,
        _request: &mut waypoint_router::Request,
        _response: &mut waypoint_router::Response,
    ) -> bool {
        true
    }
}
