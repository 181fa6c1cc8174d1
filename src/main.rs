use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratesync::core::log::init_logging;
use ratesync::{AppCommand, ConvertDirection};

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
    /// Fetch both rate feeds once and store them
    Sync,
    /// Sync on the configured interval until interrupted
    Watch,
    /// Display current rates
    Rates {
        /// Currency codes, defaults to the configured list
        codes: Vec<String>,
        /// Sync before displaying
        #[arg(long)]
        sync: bool,
    },
    /// Convert between the base currency and another currency
    Convert {
        amount: f64,
        code: String,
        /// Convert from the base currency into CODE
        #[arg(long)]
        from_base: bool,
    },
}

impl Commands {
    /// Maps to the command run against a loaded config; `Setup` has none.
    fn into_app_command(self) -> Option<AppCommand> {
        let command = match self {
            Commands::Setup => return None,
            Commands::Sync => AppCommand::Sync,
            Commands::Watch => AppCommand::Watch,
            Commands::Rates { codes, sync } => AppCommand::Rates {
                codes,
                sync_first: sync,
            },
            Commands::Convert {
                amount,
                code,
                from_base,
            } => AppCommand::Convert {
                amount,
                code,
                direction: if from_base {
                    ConvertDirection::FromBase
                } else {
                    ConvertDirection::ToBase
                },
            },
        };
        Some(command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.map(Commands::into_app_command) {
        Some(None) => ratesync::cli::setup::setup(),
        Some(Some(cmd)) => ratesync::run_command(cmd, cli.config_path.as_deref()).await,
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
