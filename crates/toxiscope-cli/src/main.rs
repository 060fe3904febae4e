use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use toxiscope_core::history::{FilterKey, SortKey};
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod commands;
mod navigator;

#[derive(Parser)]
#[command(name = "toxiscope")]
#[command(about = "Toxiscope CLI - analyze text for toxicity and manage your history", long_about = None)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "TOXISCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a piece of text
    Analyze {
        text: String,
        /// Save the result to your history (requires login)
        #[arg(long)]
        save: bool,
        /// Where the text came from
        #[arg(long)]
        url: Option<String>,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TOXISCOPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TOXISCOPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Change your password
    Password {
        #[arg(long, env = "TOXISCOPE_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
    /// List your saved analyses
    History {
        #[arg(long, default_value_t = SortKey::Latest)]
        sort: SortKey,
        #[arg(long, default_value_t = FilterKey::All)]
        filter: FilterKey,
        #[arg(long)]
        json: bool,
    },
    /// Delete one of your saved analyses
    Delete { id: i64 },
    /// Show statistics over your history
    Stats,
    /// Show or set the theme preference
    Theme { mode: Option<ThemeMode> },
    /// Check that the analysis backend is reachable
    Health,
    /// Admin panel operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List all users
    Users,
    /// List analyses across all users
    History,
    /// Delete a user account
    DeleteUser { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "toxiscope=debug" } else { "toxiscope=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = bootstrap::bootstrap(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Analyze { text, save, url, json } => commands::analyze::run(&app, text, url, save, json).await?,
        Commands::Login { email, password } => commands::account::login(&app, &email, password).await?,
        Commands::Signup { email, password } => commands::account::signup(&app, &email, password).await?,
        Commands::Logout => commands::account::logout(&app).await?,
        Commands::Whoami => commands::account::whoami(&app),
        Commands::Password { new_password } => commands::account::change_password(&app, new_password).await?,
        Commands::History { sort, filter, json } => commands::history::list(&app, sort, filter, json).await?,
        Commands::Delete { id } => commands::history::delete(&app, id).await?,
        Commands::Stats => commands::history::stats(&app).await?,
        Commands::Theme { mode } => {
            commands::account::theme(&app, mode.map(|mode| matches!(mode, ThemeMode::Dark)))?
        }
        Commands::Health => commands::analyze::health(&app).await?,
        Commands::Admin { action } => match action {
            AdminAction::Users => commands::admin::users(&app).await?,
            AdminAction::History => commands::admin::history(&app).await?,
            AdminAction::DeleteUser { id } => commands::admin::delete_user(&app, &id).await?,
        },
    }

    Ok(())
}
