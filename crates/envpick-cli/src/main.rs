//! envpick CLI: the `envpick` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_logging();
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::PickerUrl { request, json } => {
            commands::picker_url::run(&config, request, json)
        }

        Commands::Lookup {
            service_id,
            source,
            json,
        } => commands::lookup::run(&config, service_id, source, json),

        Commands::Resolve {
            request,
            optional,
            source,
            script,
            json,
        } => commands::resolve::run(
            config,
            commands::resolve::Args {
                request,
                optional,
                source,
                script,
                json,
            },
        ),
    }
}
