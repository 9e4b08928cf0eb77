use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "dailyquote", version, about = "Unlock one quote per day")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's quote, unlocking a new one on a new day
    Today(commands::today::TodayArgs),
    /// List previously unlocked quotes
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show unlock progress
    Status(commands::quotes::StatusArgs),
    /// Write unlocked quotes to a file
    Export(commands::quotes::ExportArgs),
    /// Forget all progress and start again
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Today(args) => commands::today::run(args).await,
        Commands::List { json } => commands::quotes::list(json),
        Commands::Status(args) => commands::quotes::status(args),
        Commands::Export(args) => commands::quotes::export(args),
        Commands::Reset { yes } => commands::reset::run(yes),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dailyquote", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
