use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use dipdca::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the price API and frontend server
    Serve {
        /// Address to bind, overrides the configured host
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => dipdca::cli::setup::setup(),
        Some(Commands::Serve { host, port }) => {
            let options = dipdca::ServeOptions { host, port };
            dipdca::serve(cli.config_path.as_deref(), options).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
