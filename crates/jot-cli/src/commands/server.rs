use crate::cli::ServerCommands;
use crate::commands::common::open_client;
use crate::error::CliError;

pub async fn run_server(command: ServerCommands) -> Result<(), CliError> {
    let client = open_client()?;
    match command {
        ServerCommands::Show => {
            let server_url = client.session().server_url();
            if server_url.is_empty() {
                println!("No server configured.");
            } else {
                println!("{server_url}");
            }
        }
        ServerCommands::Set { url } => {
            let stored = client.api().update_base_url(&url).await?;
            println!("{stored}");
        }
    }
    Ok(())
}
