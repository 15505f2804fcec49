//! Auth command handlers

use std::path::Path;

use crate::cli::{AuthAction, Cli, Command};
use crate::error::PlatformError;
use crate::output::output_key_values;
use crate::platform::credentials::Token;
use crate::ui::confirm_action;

use super::store::TokenStore;

/// Run the auth command
///
/// Works on local token files only, so no client is needed.
pub fn run_auth_command(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Auth { action } = &cli.command else {
        unreachable!()
    };
    let kind = cli.token_kind();

    match action {
        AuthAction::Show => {
            let (token, path) = match &cli.token {
                Some(path) => (Token::from_file(kind, path)?, path.clone()),
                None => {
                    let store = TokenStore::new(kind)?;
                    let token = store.load()?.ok_or_else(|| {
                        PlatformError::Credential(format!(
                            "No {} token is activated; run 'voxctl auth activate <path>'",
                            kind.label()
                        ))
                    })?;
                    (token, store.path().to_path_buf())
                }
            };
            output_key_values(&token_rows(&token, &path));
        }
        AuthAction::Activate { path } => {
            let store = TokenStore::new(kind)?;
            let token = store.activate(path)?;
            println!(
                "✓ Activated {} token '{}' at {}",
                kind.label(),
                token.token_id().unwrap_or("unknown"),
                store.path().display()
            );
        }
        AuthAction::Deactivate { yes } => {
            let store = TokenStore::new(kind)?;
            let prompt = format!("Deactivate the {} token at {}?", kind.label(), store.path().display());
            if !confirm_action(&prompt, *yes || cli.batch)? {
                println!("Cancelled");
                return Ok(());
            }

            if store.deactivate()? {
                println!("✓ Deactivated {} token", kind.label());
            } else {
                println!("No {} token to deactivate", kind.label());
            }
        }
    }

    Ok(())
}

fn token_rows(token: &Token, path: &Path) -> Vec<(&'static str, String)> {
    vec![
        ("id", token.token_id().unwrap_or("").to_string()),
        ("type", token.kind().label().to_string()),
        ("path", path.display().to_string()),
        ("key", token.masked_key()),
        ("base url", token.base_api_url().to_string()),
        (
            "creation date",
            token
                .created_at()
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
        ),
    ]
}
