use crate::server;
use clap::{Args, Parser, Subcommand};
use jobboard::applications::ApplicationStatus;
use jobboard::error::AppError;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(
    name = "jobboard-api",
    about = "Run the job board API or inspect its application workflow",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the application status transition table
    Transitions(TransitionArgs),
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

#[derive(Args, Debug, Default)]
pub(crate) struct TransitionArgs {
    /// Emit the table as JSON instead of aligned text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Transitions(args) => {
            println!("{}", render_transitions(&args));
            Ok(())
        }
    }
}

pub(crate) fn render_transitions(args: &TransitionArgs) -> String {
    if args.json {
        let table: serde_json::Map<String, serde_json::Value> = ApplicationStatus::ALL
            .into_iter()
            .map(|status| {
                let targets: Vec<&str> = status
                    .allowed_targets()
                    .iter()
                    .map(|target| target.label())
                    .collect();
                (status.label().to_string(), json!(targets))
            })
            .collect();
        return serde_json::Value::Object(table).to_string();
    }

    let mut out = format!("{:<10} ALLOWED NEXT\n", "FROM");
    for status in ApplicationStatus::ALL {
        let targets = status.allowed_targets();
        let listed = if targets.is_empty() {
            "(terminal)".to_string()
        } else {
            targets
                .iter()
                .map(|target| target.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("{:<10} {listed}\n", status.label()));
    }
    out.trim_end().to_string()
}
