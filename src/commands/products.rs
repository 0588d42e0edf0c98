//! Products command - catalog browsing and management.

use super::signed_in;
use crate::cli::args::{ProductFields, ProductsAction, ProductsArgs};
use crate::domain::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::errors::AppResult;
use crate::services::ServiceContainer;
use crate::types::PaginationParams;

/// Execute a products subcommand
pub async fn execute(args: ProductsArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let catalog = services.products();

    match args.action {
        ProductsAction::List {
            category,
            search,
            available,
            page,
            per_page,
        } => {
            let filter = ProductFilter {
                category,
                search,
                available_only: available,
            };
            let page = catalog
                .list_page(filter, PaginationParams::new(page, per_page))
                .await?;

            print_products(&page.data);
            println!(
                "Page {} of {} ({} products)",
                page.meta.page, page.meta.total_pages, page.meta.total
            );
        }
        ProductsAction::Show { id } => print_details(&catalog.get_product(id).await?),
        ProductsAction::LowStock => {
            let session = signed_in(services).await?;
            print_products(&catalog.low_stock(&session).await?);
        }
        ProductsAction::Add {
            name,
            price,
            category,
            quantity,
            fields,
        } => {
            let session = signed_in(services).await?;
            let product = NewProduct {
                name,
                description: fields.description.unwrap_or_default(),
                price,
                category,
                image_url: fields.image_url.unwrap_or_default(),
                quantity,
                size: fields.size,
                color: fields.color,
            };
            let created = catalog.create_product(&session, product).await?;
            println!("Added product #{}", created.id);
        }
        ProductsAction::Update {
            id,
            name,
            price,
            category,
            quantity,
            fields,
        } => {
            let session = signed_in(services).await?;
            let ProductFields {
                description,
                image_url,
                size,
                color,
            } = fields;
            let update = ProductUpdate {
                name,
                description,
                price,
                category,
                image_url,
                quantity,
                size,
                color,
            };
            print_details(&catalog.update_product(&session, id, update).await?);
        }
        ProductsAction::Stock { id, quantity } => {
            let session = signed_in(services).await?;
            let product = catalog.set_stock(&session, id, quantity).await?;
            println!("{} now has {} in stock", product.name, product.quantity);
        }
        ProductsAction::Delete { id } => {
            let session = signed_in(services).await?;
            catalog.delete_product(&session, id).await?;
            println!("Deleted product #{}", id);
        }
    }

    Ok(())
}

/// One catalog line: id, name, category, price and stock
pub(crate) fn product_row(product: &Product) -> String {
    let stock = if product.is_available() {
        format!("{} in stock", product.quantity)
    } else {
        "out of stock".to_string()
    };
    format!(
        "#{:<5} {:<32} {:<12} {:>10}  {}",
        product.id,
        product.name,
        product.category.display_name(),
        product.price,
        stock
    )
}

pub(crate) fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products");
    }
    for product in products {
        println!("{}", product_row(product));
    }
}

fn print_details(product: &Product) {
    println!("{}", product_row(product));
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    if let Some(size) = &product.size {
        println!("  Size:  {}", size);
    }
    if let Some(color) = &product.color {
        println!("  Color: {}", color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use rust_decimal::Decimal;

    fn product(quantity: i32) -> Product {
        Product {
            id: 12,
            name: "Desk lamp".to_string(),
            description: String::new(),
            price: Decimal::new(2450, 2),
            category: Category::Home,
            image_url: String::new(),
            quantity,
            size: None,
            color: None,
        }
    }

    #[test]
    fn test_row_shows_stock() {
        let row = product_row(&product(3));
        assert!(row.starts_with("#12"));
        assert!(row.contains("24.50"));
        assert!(row.ends_with("3 in stock"));
    }

    #[test]
    fn test_row_marks_sold_out() {
        assert!(product_row(&product(0)).ends_with("out of stock"));
    }
}
