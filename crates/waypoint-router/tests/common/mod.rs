#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use waypoint_router::{
    Controller, Dispatcher, Filter, Invocation, Method, Outcome, Param, Registry, Request,
    Response, RouteTable, Signature,
};

/// A REST controller that echoes the action and its resolved arguments.
pub struct Posts;

impl Controller for Posts {
    fn action(&self, action: &str) -> Option<Signature> {
        match action {
            "list" => Some(Signature::new(vec![Param::integer("page").with_default(1)])),
            "view" | "delete" => Some(Signature::new(vec![Param::integer("id")])),
            "create" => Some(Signature::new(vec![Param::body("post")])),
            "update" => Some(Signature::new(vec![Param::integer("id"), Param::body("post")])),
            "bySlug" => Some(Signature::new(vec![Param::text("slug")])),
            _ => None,
        }
    }

    fn invoke(&self, action: &str, call: Invocation<'_>) -> Option<Outcome> {
        Some(json!({ "action": action, "args": call.args }).into())
    }
}

/// A controller with a constructor dependency that writes to the response.
pub struct Greeter;

impl Controller for Greeter {
    fn constructor(&self) -> Signature {
        Signature::new(vec![Param::text("lang").with_default("en")])
    }

    fn action(&self, action: &str) -> Option<Signature> {
        (action == "hello").then(|| Signature::new(vec![Param::text("name")]))
    }

    fn invoke(&self, _action: &str, call: Invocation<'_>) -> Option<Outcome> {
        let greeting = match call.constructor[0].as_str() {
            Some("fr") => "Bonjour",
            _ => "Hello",
        };
        let name = call.args[0].as_str().unwrap_or_default();
        call.response.set_header("Content-Type", "text/plain");
        call.response.set_body(format!("{greeting}, {name}"));
        None
    }
}

pub fn registry() -> Registry {
    Registry::new()
        .controller("PostsController", Posts)
        .controller("Greeter", Greeter)
}

pub fn dispatch(table: &RouteTable, method: Method, path: &str) -> Outcome {
    Dispatcher::new(table, registry())
        .handle(method, path)
        .unwrap_or_else(|e| panic!("Failed to dispatch {method} {path}: {e}"))
}

/// A closure filter that counts its calls and answers `verdict`.
pub fn counting_filter(counter: &Arc<AtomicUsize>, verdict: bool) -> Filter {
    let counter = Arc::clone(counter);
    Filter::from_fn(move |_req: &mut Request, _res: &mut Response| {
        counter.fetch_add(1, Ordering::SeqCst);
        verdict
    })
}

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
