use clap::{Parser, Subcommand};

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::handlers::router;
use crate::i18n;
use crate::state::{AppState, Registries};

#[derive(Parser)]
#[command(name = "global-api")]
#[command(about = "Viewset API server with serializer-driven validation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to bind, overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Print the password digest for an AUTH_USERS entry")]
    HashPassword {
        username: String,
        password: String,
    },

    #[command(about = "Build every serializer registry and report wiring errors")]
    Check,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::HashPassword { username, password } => {
            println!("{}:{}", username, hash_password(&username, &password));
            Ok(())
        }
        Commands::Check => {
            Registries::build()?;
            println!("serializer registries OK");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    let language = config.i18n.language.clone();
    if !i18n::activate(&language) {
        tracing::warn!(language = %language, "language already activated, keeping {}", i18n::active_language());
    }
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if config.auth.users.is_empty() {
        tracing::warn!("no AUTH_USERS configured, every login will fail");
    }

    let port = port.unwrap_or(config.server.port);
    let state = AppState::new(config)?;
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
