use crate::cli::SourceArgs;
use crate::support::{
    EXIT_FAILURE, collaborators_or_exit, print_json_or_exit, runtime_or_exit,
};
use envpick_context::{ContextError, NavigationResult, NegotiationConfig, TokenOptions};
use std::process;

pub fn run(config: &NegotiationConfig, service_id: String, source: SourceArgs, json_output: bool) {
    let (tokens, lookup) = collaborators_or_exit(source);
    let url = config.lookup_url_for(&service_id);

    let outcome: Result<NavigationResult, ContextError> = runtime_or_exit().block_on(async {
        let token = tokens.get_token(TokenOptions::default()).await?;
        Ok(lookup.request_with_token(&url, &token).await?)
    });
    let navigation = outcome.unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(EXIT_FAILURE);
    });

    if json_output {
        print_json_or_exit("lookup", &navigation);
    } else {
        println!("envpick lookup");
        println!("  Service: {service_id}");
        println!("  Lookup URL: {url}");
        println!("  Environments: {}", navigation.len());
        for candidate in &navigation.environments {
            println!("    - {}", candidate.id);
        }
    }
}
