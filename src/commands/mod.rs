//! Commands module - CLI command implementations.
//!
//! Each command group lives in its own module. Everything except
//! `migrate` runs against a connected `Services` container with the
//! persisted session restored.

pub mod account;
pub mod cart;
pub mod export;
pub mod favorites;
pub mod migrate;
pub mod orders;
pub mod products;
pub mod stats;

use crate::cli::ShopCommand;
use crate::config::Config;
use crate::domain::Session;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Connect, migrate and pick up the session from the previous run.
pub async fn bootstrap(config: &Config) -> AppResult<Services> {
    let db = Database::connect(config).await?;
    let services = Services::from_connection(db.get_connection(), config);

    if let Some(session) = services.auth().restore().await? {
        tracing::debug!(user = %session.username, "Continuing session");
    }

    Ok(services)
}

/// Execute a shop command
pub async fn execute(command: ShopCommand, config: Config) -> AppResult<()> {
    let services = bootstrap(&config).await?;
    let services: &dyn ServiceContainer = &services;

    match command {
        ShopCommand::Register(args) => account::register(args, services).await,
        ShopCommand::Login(args) => account::login(args, services).await,
        ShopCommand::Logout => account::logout(services).await,
        ShopCommand::Whoami => account::whoami(services).await,
        ShopCommand::Profile(args) => account::profile(args, services).await,
        ShopCommand::Products(args) => products::execute(args, services).await,
        ShopCommand::Cart(args) => cart::execute(args, services).await,
        ShopCommand::Favorites(args) => favorites::execute(args, services).await,
        ShopCommand::Orders(args) => orders::execute(args, services).await,
        ShopCommand::Stats(args) => stats::execute(args, services, &config).await,
        ShopCommand::Export(args) => export::execute(args, services).await,
    }
}

pub(crate) async fn signed_in(services: &dyn ServiceContainer) -> AppResult<Session> {
    services.auth().require_session().await
}

/// Signed-in manager session, for reporting commands
pub(crate) async fn manager(services: &dyn ServiceContainer) -> AppResult<Session> {
    let session = signed_in(services).await?;
    session.require_manager()?;
    Ok(session)
}
