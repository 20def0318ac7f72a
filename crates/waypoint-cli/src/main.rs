//! waypoint CLI
//!
//! Command-line tool for inspecting route manifests.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use waypoint_router::{Manifest, Method, RouteTable};

/// Inspect request routes declared in a JSON manifest.
#[derive(Parser)]
#[command(name = "waypoint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route manifest (JSON).
    #[arg(short, long, env = "WAYPOINT_MANIFEST", default_value = "routes.json")]
    manifest: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route in match order.
    Routes {
        /// Only list routes for this method.
        #[arg(short, long)]
        method: Option<String>,
    },

    /// Show which route a request would be dispatched to.
    Match {
        /// HTTP method.
        method: String,

        /// Request path, optionally with a query string.
        path: String,

        /// Match case-sensitively (overrides the manifest config).
        #[arg(long)]
        case_sensitive: bool,

        /// Print the match as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Build the path of a named route.
    Url {
        /// Route name.
        name: String,

        /// HTTP method the route is registered under.
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Segments appended to the path.
        segments: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("Failed to load manifest {}", cli.manifest.display()))?;
    let table = manifest.build_table();
    debug!(routes = table.len(), "route table built");

    match cli.command {
        Commands::Routes { method } => {
            let filter = method.as_deref().map(Method::parse);
            print_routes(&table, filter);
        }

        Commands::Match {
            method,
            path,
            case_sensitive,
            json,
        } => {
            let method = Method::parse(&method);
            let path = path.split_once('?').map_or(path.as_str(), |(p, _)| p);
            let path = waypoint_router::decode_path(path);
            let case_sensitive = case_sensitive || manifest.config.case_sensitive;

            let Some(found) = table.find(method, &path, case_sensitive) else {
                bail!("No route matches {method} {path}");
            };
            let params: Vec<_> = found
                .route
                .param_keys()
                .iter()
                .zip(&found.captures)
                .collect();

            if json {
                let bound: serde_json::Map<_, _> = params
                    .iter()
                    .map(|(k, v)| ((*k).clone(), json!(v)))
                    .collect();
                let report = json!({
                    "method": method,
                    "pattern": found.route.path(),
                    "handler": found.route.expression_display(),
                    "name": found.route.name(),
                    "params": bound,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{method} {path}");
                println!("  pattern: {}", found.route.path());
                println!("  handler: {}", found.route.expression_display());
                if !found.route.name().is_empty() {
                    println!("  name:    {}", found.route.name());
                }
                for (key, value) in params {
                    println!("  {key} = {value}");
                }
            }
        }

        Commands::Url {
            name,
            method,
            segments,
        } => {
            let method = Method::parse(&method);
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            match table.reverse_lookup(&name, method, &segments) {
                Some(url) => println!("{url}"),
                None => bail!("No route named '{name}' for {method}"),
            }
        }
    }

    Ok(())
}

fn print_routes(table: &RouteTable, method: Option<Method>) {
    let routes: Vec<_> = table
        .iter()
        .filter(|route| method.is_none_or(|m| route.method() == m))
        .collect();

    if routes.is_empty() {
        info!("No routes declared.");
        return;
    }

    println!("\n{:<8} {:<40} {:<32} NAME", "METHOD", "PATH", "HANDLER");
    println!("{:-<92}", "");
    for route in routes {
        println!(
            "{:<8} {:<40} {:<32} {}",
            route.method().as_str(),
            route.path(),
            route.expression_display(),
            route.name()
        );
    }
    println!();
}
