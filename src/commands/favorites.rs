//! Favorites command.

use super::products::print_products;
use super::signed_in;
use crate::cli::args::{FavoritesAction, FavoritesArgs};
use crate::errors::AppResult;
use crate::services::ServiceContainer;

/// Execute a favorites subcommand
pub async fn execute(args: FavoritesArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let session = signed_in(services).await?;
    let favorites = services.favorites();

    match args.action {
        FavoritesAction::List => print_products(&favorites.favorites(&session).await?),
        FavoritesAction::Toggle { product_id } => {
            if favorites.toggle_favorite(&session, product_id).await? {
                println!("Added product #{} to favorites", product_id);
            } else {
                println!("Removed product #{} from favorites", product_id);
            }
        }
    }

    Ok(())
}
