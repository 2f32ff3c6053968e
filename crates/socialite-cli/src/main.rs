use clap::{Parser, Subcommand};

mod commands;

/// socialite: try the QQ Connect login flow from a terminal
#[derive(Parser)]
#[command(name = "socialite", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the QQ authorization URL
    Authorize(commands::authorize::AuthorizeArgs),

    /// Exchange a callback code and print the user profile
    Exchange(commands::exchange::ExchangeArgs),

    /// Obtain a new access token from a refresh token
    Refresh(commands::refresh::RefreshArgs),
}

#[tokio::main]
async fn main() {
    socialite_core::env::init_logger();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Authorize(args) => commands::authorize::run(args),
        Commands::Exchange(args) => commands::exchange::run(args).await,
        Commands::Refresh(args) => commands::refresh::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", colored::Colorize::red("error:"), e);
        std::process::exit(1);
    }
}
