use crate::cli::{RequestArgs, SourceArgs};
use envpick_context::{ContextRequest, EnvironmentLookup, NegotiationConfig, TokenProvider};
use envpick_lookup::{FileLookup, HttpEnvironmentLookup, StaticTokenProvider};
use serde::Serialize;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ENVPICK_LOG";

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_REDIRECTED: i32 = 3;

/// Token used for offline runs, where the lookup ignores it.
const OFFLINE_TOKEN: &str = "offline";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config_or_exit(path: Option<&str>) -> NegotiationConfig {
    let Some(path) = path else {
        return NegotiationConfig::default();
    };
    NegotiationConfig::load(path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(EXIT_USAGE);
    })
}

pub fn runtime_or_exit() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(EXIT_FAILURE);
        })
}

pub fn request_from_args(args: RequestArgs) -> ContextRequest {
    ContextRequest {
        service_id: args.service_id,
        environment_id: args.environment_id,
        environment_required: true,
        url: args.url,
    }
}

/// Token provider and lookup for a source: a file when `--navigation` is
/// given, the configured lookup service otherwise.
pub fn collaborators_or_exit(
    source: SourceArgs,
) -> (Arc<dyn TokenProvider>, Arc<dyn EnvironmentLookup>) {
    if let Some(path) = source.navigation {
        let token = source.token.unwrap_or_else(|| OFFLINE_TOKEN.to_string());
        return (
            Arc::new(StaticTokenProvider::new(token)),
            Arc::new(FileLookup::new(path)),
        );
    }

    let Some(token) = source.token else {
        eprintln!("error: either --token or --navigation is required");
        process::exit(EXIT_USAGE);
    };
    let lookup = HttpEnvironmentLookup::new().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(EXIT_FAILURE);
    });
    (Arc::new(StaticTokenProvider::new(token)), Arc::new(lookup))
}

pub fn print_json_or_exit<T: Serialize>(label: &str, value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        eprintln!("error: failed to render {label} payload: {err}");
        process::exit(EXIT_USAGE);
    });
    println!("{rendered}");
}
