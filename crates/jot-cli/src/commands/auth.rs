use jot_core::{ApiError, JotClient};

use crate::commands::common::{open_client, open_signed_in_client, user_to_list_item, UserListItem};
use crate::error::CliError;

pub async fn run_login(
    server: Option<&str>,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let client = open_client()?;
    let sessions = client.sessions();
    let user = match server {
        Some(server) => sessions.sign_in_to(server, username, password).await?,
        None => sessions.sign_in(username, password).await?,
    };

    println!(
        "Signed in to {} as {}",
        client.session().server_url(),
        user.label()
    );
    Ok(())
}

pub async fn run_logout() -> Result<(), CliError> {
    let client = open_client()?;
    if logout(&client).await? {
        println!("Signed out");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

/// Drop whatever is stored locally, signing out remotely only when a token
/// exists. Returns whether anything was cleared.
pub async fn logout(client: &JotClient) -> Result<bool, CliError> {
    if client.sessions().is_logged_in() {
        client.sessions().sign_out().await?;
        return Ok(true);
    }

    let store = client.session();
    if store.token().is_empty() && store.server_url().is_empty() && store.username().is_empty() {
        return Ok(false);
    }
    store.clear_all().await.map_err(ApiError::from)?;
    tracing::info!("Cleared stale session without a token");
    Ok(true)
}

pub fn run_status() -> Result<(), CliError> {
    let client = open_client()?;
    let snapshot = client.snapshot();

    if snapshot.server_url.is_empty() {
        println!("No server configured. Run `jot server set <URL>` or `jot login --server <URL> ...`.");
    } else if snapshot.logged_in {
        println!(
            "Signed in to {} as {}",
            snapshot.server_url, snapshot.username
        );
    } else {
        println!("Not signed in to {}", snapshot.server_url);
    }
    Ok(())
}

pub async fn run_whoami() -> Result<(), CliError> {
    let client = open_signed_in_client()?;
    let user = client.sessions().current_user().await?;

    println!("{} (@{}, {})", user.label(), user.username, user.role);
    if let Some(email) = user.email.as_deref().filter(|email| !email.is_empty()) {
        println!("{email}");
    }
    Ok(())
}

pub async fn run_users(as_json: bool) -> Result<(), CliError> {
    let client = open_signed_in_client()?;
    let users = client.sessions().users().await?;

    if as_json {
        let json_items = users
            .iter()
            .map(user_to_list_item)
            .collect::<Vec<UserListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for user in &users {
            println!("{:<6} {:<20} {}", user.id.0, user.username, user.role);
        }
    }
    Ok(())
}
