//! Application user command handlers

use crate::cli::{Cli, Command, UsersAction};
use crate::output::output_users;
use crate::platform::PlatformClient;

/// Run the users command (application tokens only)
pub async fn run_users_command(
    client: &PlatformClient,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Users { action } = &cli.command else {
        unreachable!()
    };

    match action {
        UsersAction::List { output } => {
            let users = client.list_users().await?;
            output_users(&users, *output, cli.no_header);
        }
        UsersAction::Create { username } => {
            client.create_user(username).await?;
            println!("✓ Created application user '{}'", username);
        }
    }

    Ok(())
}
