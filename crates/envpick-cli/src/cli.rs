use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "envpick",
    about = "envpick: negotiate the environment a request runs against",
    version
)]
pub struct Cli {
    /// Negotiation config (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Fields shared by every command that builds a context request.
#[derive(Args, Clone)]
pub struct RequestArgs {
    /// Service identifier
    #[arg(long)]
    pub service_id: Option<String>,

    /// Environment already known to the caller
    #[arg(long)]
    pub environment_id: Option<String>,

    /// Caller context URL handed to the picker
    #[arg(long)]
    pub url: Option<String>,
}

/// Where environments come from.
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Bearer token for the lookup service
    #[arg(long)]
    pub token: Option<String>,

    /// Read the navigation result from a JSON file instead of the lookup service
    #[arg(long)]
    pub navigation: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the picker URL a negotiation would embed
    PickerUrl {
        #[command(flatten)]
        request: RequestArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the authenticated environment lookup for a service
    Lookup {
        /// Service identifier
        #[arg(long)]
        service_id: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a request's environment, driving the picker from a script
    Resolve {
        #[command(flatten)]
        request: RequestArgs,

        /// Treat the environment as optional
        #[arg(long)]
        optional: bool,

        #[command(flatten)]
        source: SourceArgs,

        /// JSON array of messages the picker surface sends, in order
        #[arg(long)]
        script: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
