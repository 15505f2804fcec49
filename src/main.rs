//! voxctl - main entry point

use clap::Parser;
use log::{debug, info};

use voxctl::{
    run_analytics_command, run_auth_command, run_data_command, run_jobs_command,
    run_status_command, run_users_command, Cli, ClientConfig, Command, PlatformClient, Token,
    TokenResolver,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting voxctl v{}", env!("CARGO_PKG_VERSION"));
    debug!("CLI args: {:?}", cli);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Auth { .. } = &cli.command {
        return run_auth_command(cli);
    }

    let client = build_client(cli)?;
    match &cli.command {
        Command::Data { .. } => run_data_command(&client, cli).await,
        Command::Jobs { .. } => run_jobs_command(&client, cli).await,
        Command::Analytics { .. } => run_analytics_command(&client, cli).await,
        Command::Users { .. } => run_users_command(&client, cli).await,
        Command::Status { .. } => run_status_command(&client, cli).await,
        Command::Auth { .. } => unreachable!(),
    }
}

fn build_client(cli: &Cli) -> Result<PlatformClient, Box<dyn std::error::Error>> {
    let kind = cli.token_kind();
    let explicit = match &cli.token {
        Some(path) => Some(Token::from_file(kind, path)?),
        None => None,
    };
    let token = TokenResolver::new(kind).resolve(explicit)?;
    debug!("Using {} token {}", kind.label(), token.masked_key());

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        ..Default::default()
    };
    Ok(PlatformClient::new(token, config)?)
}
