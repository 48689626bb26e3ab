//! Jot CLI - read and write memos on a self-hosted memos server
//!
//! Quick capture from the terminal: `jot "my thought"`.

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands, VisibilityArg};
use crate::commands::add::run_add;
use crate::commands::auth::{run_login, run_logout, run_status, run_users, run_whoami};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::{build_filter, run_list};
use crate::commands::server::run_server;
use crate::commands::show::run_show;
use crate::commands::state::{run_state_change, StateChange};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "jot=info,jot_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Login {
            server,
            username,
            password,
        }) => run_login(server.as_deref(), &username, &password).await?,
        Some(Commands::Logout) => run_logout().await?,
        Some(Commands::Status) => run_status()?,
        Some(Commands::Whoami) => run_whoami().await?,
        Some(Commands::Users { json }) => run_users(json).await?,
        Some(Commands::Server { command }) => run_server(command).await?,
        Some(Commands::List {
            creator,
            status,
            visibility,
            json,
        }) => run_list(build_filter(creator, status, visibility), json).await?,
        Some(Commands::Show { id, json }) => run_show(&id, json).await?,
        Some(Commands::Add {
            content,
            visibility,
        }) => run_add(&content, visibility).await?,
        Some(Commands::Edit {
            id,
            content,
            visibility,
        }) => run_edit(&id, content.as_deref(), visibility).await?,
        Some(Commands::Pin { id }) => run_state_change(&id, StateChange::Pin).await?,
        Some(Commands::Unpin { id }) => {
            run_state_change(&id, StateChange::Unpin).await?;
        }
        Some(Commands::Archive { id }) => {
            run_state_change(&id, StateChange::Archive).await?;
        }
        Some(Commands::Restore { id }) => {
            run_state_change(&id, StateChange::Restore).await?;
        }
        Some(Commands::Delete { id }) => run_delete(&id).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture mode: jot "my thought"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(&cli.note, VisibilityArg::Private).await?;
            }
        }
    }

    Ok(())
}
