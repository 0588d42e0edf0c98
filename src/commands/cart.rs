//! Cart command.

use super::signed_in;
use crate::cli::args::{CartAction, CartArgs};
use crate::domain::CartSummary;
use crate::errors::AppResult;
use crate::services::ServiceContainer;

/// Execute a cart subcommand
pub async fn execute(args: CartArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let session = signed_in(services).await?;
    let carts = services.carts();

    match args.action {
        CartAction::List => print_cart(&carts.cart(&session).await?),
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let item = carts.add_to_cart(&session, product_id, quantity).await?;
            println!("Cart now holds {} of product #{}", item.quantity, product_id);
        }
        CartAction::Set {
            product_id,
            quantity,
        } => match carts.set_quantity(&session, product_id, quantity).await? {
            Some(item) => println!("Cart now holds {} of product #{}", item.quantity, product_id),
            None => println!("Removed product #{} from the cart", product_id),
        },
        CartAction::Remove { product_id } => {
            carts.remove_from_cart(&session, product_id).await?;
            println!("Removed product #{} from the cart", product_id);
        }
        CartAction::Clear => {
            carts.clear_cart(&session).await?;
            println!("Cart cleared");
        }
    }

    Ok(())
}

fn print_cart(cart: &CartSummary) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in &cart.lines {
        let warning = if line.exceeds_stock() {
            format!("  (only {} left)", line.product.quantity)
        } else {
            String::new()
        };
        println!(
            "#{:<5} {:<32} {:>3} x {:>10} = {:>10}{}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total(),
            warning
        );
    }
    println!("{} items, total {}", cart.item_count, cart.total);
}
