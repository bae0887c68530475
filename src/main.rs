use chrono::Local;
use clap::{Args, Parser, Subcommand};
use ficha_cadastral::error::AppError;
use ficha_cadastral::server::{self, ServeOverrides};
use ficha_cadastral::submission::{report, Submission};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Ficha Cadastral PJ",
    about = "Receive company registration submissions and deliver them by email",
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
    /// Compose the notification document for a saved form and print the HTML
    Render(RenderArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON file with the form fields as a flat string map
    #[arg(long)]
    input: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => {
            server::run(ServeOverrides {
                host: args.host,
                port: args.port,
            })
            .await
        }
        Command::Render(args) => run_render(args),
    }
}

fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let submission: Submission = serde_json::from_str(&raw)?;

    let report = report::compose(&submission, Local::now());
    println!("{}", report::render_html(&report));

    Ok(())
}
