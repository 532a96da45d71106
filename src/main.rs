use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

use report_trigger::{generate, telemetry};

#[derive(Parser)]
#[command(name = "report", about = "Trigger server-side problem report generation")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Generate(generate::GenerateCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs on stderr; respects RUST_LOG and REPORT_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Generate(args) => generate::run(args).await?,
    }

    Ok(())
}
