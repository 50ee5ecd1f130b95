use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use propctl::{
    commands::CommandHandler,
    ctx::{AppContext, DEFAULT_PAGE_PATH},
    term::TerminalDialogs,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Page model file (.json or .toml)
    #[arg(long, global = true, default_value = DEFAULT_PAGE_PATH)]
    page: PathBuf,
    /// Base URL of the property server
    #[arg(
        long,
        global = true,
        env = "PROPCTL_SERVER",
        default_value = "http://localhost:8000"
    )]
    server: String,
    /// CSRF token for REST saves, `${env:VAR}` is expanded
    #[arg(long, global = true)]
    csrf_token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,
    /// Names to answer prompts with, in order
    #[arg(long = "name", global = true)]
    names: Vec<String>,
    /// Increase log verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the page outline with resolved keys
    Show,
    /// Print the tree a save of a group would send
    Collect {
        #[arg(short, long)]
        group: String,
        /// Enforce required fields
        #[arg(long)]
        check: bool,
    },
    /// Save a group to the server
    Save {
        #[arg(short, long)]
        group: String,
    },
    /// Set the value of the control resolving to a key
    Set {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Add a map item to a container
    AddItem {
        #[arg(short, long)]
        container: String,
    },
    /// Delete a map item
    DeleteItem {
        #[arg(short, long)]
        item: String,
    },
    /// Expand or collapse a map item
    Toggle {
        #[arg(short, long)]
        item: String,
    },
    /// Load stored properties from a JSON file into the page
    Hydrate {
        #[arg(short, long)]
        properties: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let ctx = AppContext {
        page_path: cli.page,
        server: cli.server,
        csrf_token: cli.csrf_token,
        timeout: Duration::from_secs(cli.timeout),
    };
    let dialogs = || {
        TerminalDialogs::stdio()
            .with_names(cli.names.clone())
            .assume_yes(cli.yes)
    };

    match cli.command {
        Command::Show => CommandHandler::show(&ctx),
        Command::Collect { group, check } => CommandHandler::collect(&ctx, &group, check),
        Command::Save { group } => CommandHandler::save(&ctx, &group, dialogs()).await,
        Command::Set { key, value } => CommandHandler::set(&ctx, &key, &value, dialogs()),
        Command::AddItem { container } => CommandHandler::add_item(&ctx, &container, dialogs()),
        Command::DeleteItem { item } => {
            CommandHandler::delete_item(&ctx, &item, dialogs()).await
        }
        Command::Toggle { item } => CommandHandler::toggle(&ctx, &item),
        Command::Hydrate { properties } => CommandHandler::hydrate(&ctx, &properties),
    }
}
