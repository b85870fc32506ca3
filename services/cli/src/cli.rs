use crate::commands::{run_generate, run_load, run_recommend, GenerateArgs, RosterArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use docgen::config::AppConfig;
use docgen::error::AppError;
use docgen::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "docgen",
    about = "Generate officials development reports from a registration roster export",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load roster exports and print the normalised officials
    Load(RosterArgs),
    /// Print each official's recommended next steps
    Recommend {
        #[command(flatten)]
        roster: RosterArgs,
        /// Emit recommendations as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write per-official reports, the combined report and the email list
    Generate(GenerateArgs),
    /// Print the effective configuration as JSON
    Config,
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Load(args) => run_load(&config, args),
        Command::Recommend { roster, json } => run_recommend(&config, roster, json),
        Command::Generate(args) => run_generate(&config, args).await,
        Command::Config => {
            println!("{}", render_json(&config));
            Ok(())
        }
        Command::Serve(args) => server::run(config, args).await,
    }
}

pub(crate) fn render_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| format!("{{\"error\": \"failed to encode output: {err}\"}}"))
}
