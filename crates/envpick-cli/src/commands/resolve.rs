use crate::cli::{RequestArgs, SourceArgs};
use crate::support::{
    EXIT_FAILURE, EXIT_REDIRECTED, EXIT_USAGE, collaborators_or_exit, print_json_or_exit,
    request_from_args, runtime_or_exit,
};
use envpick_context::{ContextResolver, ErrorNavigator, NegotiationConfig, TokenErrorCode};
use envpick_overlay::MemorySurface;
use serde_json::{Value, json};
use std::fs;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long a picker may stay open after its script is exhausted.
const SCRIPT_GRACE: Duration = Duration::from_secs(2);

pub struct Args {
    pub request: RequestArgs,
    pub optional: bool,
    pub source: SourceArgs,
    pub script: Option<String>,
    pub json: bool,
}

/// Leaves the process the way a page leaves for the error flow.
struct ExitNavigator {
    config: NegotiationConfig,
    return_url: Option<String>,
    json: bool,
}

impl ErrorNavigator for ExitNavigator {
    fn redirect_to_error(&self, code: TokenErrorCode) {
        let url = self
            .config
            .error_url_for(code, self.return_url.as_deref());
        if self.json {
            print_json_or_exit(
                "resolve",
                &json!({
                    "outcome": "redirected",
                    "code": code.code(),
                    "errorUrl": url,
                }),
            );
        } else {
            println!("redirected ({code}): {url}");
        }
        process::exit(EXIT_REDIRECTED);
    }
}

pub fn run(config: NegotiationConfig, args: Args) {
    let script = args.script.as_deref().map(read_script_or_exit).unwrap_or_default();
    let mut request = request_from_args(args.request);
    request.environment_required = !args.optional;

    let (tokens, lookup) = collaborators_or_exit(args.source);
    let surface = Arc::new(MemorySurface::new());
    let navigator = Arc::new(ExitNavigator {
        config: config.clone(),
        return_url: request.url.clone(),
        json: args.json,
    });
    let resolver = ContextResolver::new(config, tokens, lookup, navigator, surface.clone());

    let outcome = runtime_or_exit().block_on(async {
        tokio::select! {
            outcome = resolver.ensure_context(request) => Some(outcome),
            () = play_script(Arc::clone(&surface), script) => None,
        }
    });
    let exchange: Vec<Value> = surface
        .posted()
        .into_iter()
        .map(|message| message.payload)
        .collect();

    match outcome {
        Some(Ok(resolved)) => {
            if args.json {
                print_json_or_exit(
                    "resolve",
                    &json!({
                        "outcome": "resolved",
                        "request": resolved,
                        "exchange": exchange,
                    }),
                );
            } else {
                println!("envpick resolve");
                println!(
                    "  Service: {}",
                    resolved.service_id().unwrap_or("(none)")
                );
                println!(
                    "  Environment: {}",
                    resolved.environment_id().unwrap_or("(not required)")
                );
                println!("  Picker messages sent: {}", exchange.len());
            }
        }
        Some(Err(err)) => {
            if args.json
                && let Some(rejection) = err.rejection()
            {
                print_json_or_exit(
                    "resolve",
                    &json!({
                        "outcome": "rejected",
                        "reason": rejection.reason,
                        "exchange": exchange,
                    }),
                );
            }
            eprintln!("error: {err}");
            process::exit(EXIT_FAILURE);
        }
        None => {
            eprintln!("error: picker script ended without selecting or canceling");
            process::exit(EXIT_FAILURE);
        }
    }
}

fn read_script_or_exit(path: &str) -> Vec<Value> {
    let raw = fs::read(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read script {path}: {e}");
        process::exit(EXIT_USAGE);
    });
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        eprintln!("error: script {path} must be a JSON array of messages: {e}");
        process::exit(EXIT_USAGE);
    })
}

/// Play the picker surface's side: deliver each scripted message from the
/// child view, then give the negotiation a grace period to finish.
async fn play_script(surface: Arc<MemorySurface>, script: Vec<Value>) {
    if !script.is_empty() {
        let view = surface.wait_for_child_view().await;
        for message in script {
            if surface.deliver_from_view(view, message) == 0 {
                debug!(%view, "picker view closed; dropping remaining script");
                break;
            }
            tokio::task::yield_now().await;
        }
    }
    tokio::time::sleep(SCRIPT_GRACE).await;
}
