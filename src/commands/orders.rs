//! Orders command - checkout and order tracking.

use super::signed_in;
use crate::cli::args::{OrdersAction, OrdersArgs};
use crate::domain::{CheckoutDetails, Order, OrderDetails};
use crate::errors::AppResult;
use crate::services::ServiceContainer;

/// Execute an orders subcommand
pub async fn execute(args: OrdersArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let session = signed_in(services).await?;
    let orders = services.orders();

    match args.action {
        OrdersAction::Checkout {
            name,
            phone,
            email,
            address,
            delivery_price,
            payment_method,
            notes,
        } => {
            let checkout = CheckoutDetails {
                customer_name: name,
                customer_phone: phone,
                customer_email: email,
                customer_address: address,
                delivery_price,
                payment_method,
                notes,
            };
            let details = orders.place_order(&session, checkout).await?;
            println!("Order #{} placed", details.order.id);
            print_details(&details);
        }
        OrdersAction::List { all, status } => {
            let list = match status {
                Some(status) => orders.orders_by_status(&session, status).await?,
                None if all => orders.all_orders(&session).await?,
                None => orders.my_orders(&session).await?,
            };
            print_orders(&list);
        }
        OrdersAction::Show { id } => print_details(&orders.order_details(&session, id).await?),
        OrdersAction::Status { id, status } => {
            orders.update_status(&session, id, status).await?;
            println!("Order #{} is now {}", id, status);
        }
    }

    Ok(())
}

pub(crate) fn order_row(order: &Order) -> String {
    format!(
        "#{:<6} {}  {:<10} {:>10}  {}",
        order.id,
        order.order_date.format("%Y-%m-%d %H:%M"),
        order.status.display_name(),
        order.total_amount,
        order.customer_name
    )
}

/// Orders that are neither delivered nor cancelled
fn in_progress(orders: &[Order]) -> usize {
    orders.iter().filter(|order| !order.status.is_final()).count()
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders");
        return;
    }
    for order in orders {
        println!("{}", order_row(order));
    }
    println!("{} of {} in progress", in_progress(orders), orders.len());
}

fn print_details(details: &OrderDetails) {
    let order = &details.order;
    println!("{}", order_row(order));
    println!("  Ship to: {}, {}", order.customer_name, order.customer_address);
    println!("  Contact: {} / {}", order.customer_phone, order.customer_email);
    if let Some(method) = &order.payment_method {
        println!("  Payment: {}", method);
    }
    if let Some(price) = order.delivery_price {
        println!("  Delivery: {}", price);
    }

    for line in &details.lines {
        let name = line
            .product_name
            .clone()
            .unwrap_or_else(|| format!("Product #{} (removed)", line.product_id));
        println!(
            "    {:<32} {:>3} x {:>10} = {:>10}",
            name,
            line.quantity,
            line.price_per_item,
            line.line_total()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            user_id: 1,
            order_date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            total_amount: Decimal::new(25000, 2),
            status,
            customer_name: "Sam".to_string(),
            customer_phone: String::new(),
            customer_email: String::new(),
            customer_address: String::new(),
            delivery_price: None,
            payment_method: None,
            notes: None,
        }
    }

    #[test]
    fn test_in_progress_skips_delivered_and_cancelled() {
        let orders = [
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::Delivered),
            order(3, OrderStatus::Shipped),
            order(4, OrderStatus::Cancelled),
        ];
        assert_eq!(in_progress(&orders), 2);
        assert_eq!(in_progress(&[]), 0);
    }

    #[test]
    fn test_order_row() {
        let order = order(42, OrderStatus::Shipped);

        let row = order_row(&order);
        assert!(row.starts_with("#42"));
        assert!(row.contains("2026-03-14 09:30"));
        assert!(row.contains(OrderStatus::Shipped.display_name()));
        assert!(row.ends_with("Sam"));
    }
}
