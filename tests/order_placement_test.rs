//! Checkout against a real database: stock, totals and rollback.

mod common;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement, TransactionTrait};

use common::{checkout, file_shop, shop};
use shopkeeper::domain::{Category, OrderStatus, UserRole};
use shopkeeper::errors::AppError;
use shopkeeper::services::ServiceContainer;

#[tokio::test]
async fn test_checkout_takes_stock_and_empties_cart() {
    let shop = shop().await;
    let a = shop.product("Canvas tote", 100, 5, Category::Accessories).await;
    let b = shop.product("Wool scarf", 50, 1, Category::Clothing).await;

    shop.add_to_cart(&shop.customer, a.id, 2).await;
    shop.add_to_cart(&shop.customer, b.id, 1).await;

    let details = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();

    assert_eq!(details.order.total_amount, Decimal::from(250));
    assert_eq!(details.order.status, OrderStatus::Pending);
    assert_eq!(details.order.user_id, shop.customer.user_id);
    assert_eq!(details.lines.len(), 2);
    assert_eq!(details.items_total(), details.order.total_amount);

    assert_eq!(shop.stock_of(a.id).await, 3);
    assert_eq!(shop.stock_of(b.id).await, 0);

    let cart = shop.services.carts().cart(&shop.customer).await.unwrap();
    assert!(cart.is_empty());

    let mine = shop.services.orders().my_orders(&shop.customer).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, details.order.id);
}

#[tokio::test]
async fn test_snapshot_price_survives_price_change() {
    let shop = shop().await;
    let a = shop.product("Desk lamp", 40, 3, Category::Home).await;
    shop.add_to_cart(&shop.customer, a.id, 1).await;

    let placed = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();

    shop.services
        .products()
        .update_product(
            &shop.manager,
            a.id,
            shopkeeper::domain::ProductUpdate {
                price: Some(Decimal::from(55)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let details = shop
        .services
        .orders()
        .order_details(&shop.customer, placed.order.id)
        .await
        .unwrap();
    assert_eq!(details.lines[0].price_per_item, Decimal::from(40));
    assert_eq!(details.lines[0].product_name.as_deref(), Some("Desk lamp"));
    assert_eq!(details.order.total_amount, Decimal::from(40));
}

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
    let shop = shop().await;

    let result = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Cart is empty"));
    let all = shop.services.orders().all_orders(&shop.manager).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_insufficient_stock_leaves_everything_untouched() {
    let shop = shop().await;
    let c = shop.product("Trail shoes", 80, 2, Category::Shoes).await;
    shop.add_to_cart(&shop.customer, c.id, 2).await;

    // Stock sold elsewhere after the item went into the cart
    shop.services
        .products()
        .set_stock(&shop.manager, c.id, 0)
        .await
        .unwrap();

    let result = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientStock {
            available: 0,
            requested: 2,
            ..
        })
    ));
    assert_eq!(shop.stock_of(c.id).await, 0);
    assert!(shop.services.orders().all_orders(&shop.manager).await.unwrap().is_empty());

    let cart = shop.services.carts().cart(&shop.customer).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert!(cart.lines[0].exceeds_stock());
}

#[tokio::test]
async fn test_failure_on_later_line_rolls_back_earlier_decrements() {
    let shop = shop().await;
    let a = shop.product("Notebook", 10, 5, Category::Books).await;
    let b = shop.product("Fountain pen", 30, 1, Category::Accessories).await;

    shop.add_to_cart(&shop.customer, a.id, 2).await;
    shop.add_to_cart(&shop.customer, b.id, 1).await;
    shop.services
        .products()
        .set_stock(&shop.manager, b.id, 0)
        .await
        .unwrap();

    let result = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
    assert_eq!(shop.stock_of(a.id).await, 5);
    assert!(shop.services.orders().all_orders(&shop.manager).await.unwrap().is_empty());
    assert_eq!(
        shop.services.carts().cart(&shop.customer).await.unwrap().item_count,
        3
    );
}

#[tokio::test]
async fn test_orders_are_private_to_their_owner() {
    let shop = shop().await;
    let other = common::register(&shop.services, "jordan", UserRole::Customer).await;
    let a = shop.product("Yoga mat", 25, 4, Category::Sports).await;
    shop.add_to_cart(&shop.customer, a.id, 1).await;

    let placed = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();
    let orders = shop.services.orders();

    assert!(matches!(
        orders.order_details(&other, placed.order.id).await,
        Err(AppError::Forbidden)
    ));
    assert!(orders.my_orders(&other).await.unwrap().is_empty());
    assert!(matches!(
        orders.all_orders(&other).await,
        Err(AppError::Forbidden)
    ));

    let seen = orders.order_details(&shop.manager, placed.order.id).await.unwrap();
    assert_eq!(seen.order.id, placed.order.id);
}

#[tokio::test]
async fn test_manager_moves_order_through_statuses() {
    let shop = shop().await;
    let a = shop.product("Headphones", 120, 2, Category::Electronics).await;
    shop.add_to_cart(&shop.customer, a.id, 1).await;
    let placed = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();
    let orders = shop.services.orders();

    for status in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders
            .update_status(&shop.manager, placed.order.id, status)
            .await
            .unwrap();
    }

    let delivered = orders
        .orders_by_status(&shop.manager, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.len(), 1);
    assert!(orders
        .orders_by_status(&shop.manager, OrderStatus::Pending)
        .await
        .unwrap()
        .is_empty());

    assert!(matches!(
        orders.update_status(&shop.manager, 9999, OrderStatus::Cancelled).await,
        Err(AppError::NotFound("Order"))
    ));
}

#[tokio::test]
async fn test_racing_checkouts_sell_the_last_unit_once() {
    let shop = file_shop().await;
    let rival = common::register(&shop.services, "riley", UserRole::Customer).await;
    let orders = shop.services.orders();

    for round in 0..10 {
        let last = shop
            .product(&format!("Limited print {}", round), 45, 1, Category::Home)
            .await;
        shop.add_to_cart(&shop.customer, last.id, 1).await;
        shop.add_to_cart(&rival, last.id, 1).await;

        let (first, second) = tokio::join!(
            orders.place_order(&shop.customer, checkout()),
            orders.place_order(&rival, checkout())
        );

        let (placed, lost, loser) = match (first, second) {
            (Ok(placed), Err(e)) => (placed, e, &rival),
            (Err(e), Ok(placed)) => (placed, e, &shop.customer),
            (first, second) => panic!("expected one winner, got {:?} and {:?}", first, second),
        };

        assert_eq!(placed.lines[0].product_id, last.id);
        assert!(
            matches!(
                lost,
                AppError::InsufficientStock { .. } | AppError::StockUpdateFailed(_)
            ),
            "round {}: lost checkout failed with {:?}",
            round,
            lost
        );
        assert_eq!(shop.stock_of(last.id).await, 0);

        // The losing cart is kept for another try
        shop.services.carts().clear_cart(loser).await.unwrap();
    }

    let all = orders.all_orders(&shop.manager).await.unwrap();
    assert_eq!(all.len(), 10);
}

#[tokio::test]
async fn test_checkout_locked_out_of_stock_reports_conflict() {
    let shop = file_shop().await;
    let a = shop.product("Ceramic mug", 12, 3, Category::Home).await;
    shop.add_to_cart(&shop.customer, a.id, 1).await;

    // Another connection holds the write lock on the products
    let connection = shop.db.connection();
    let holder = connection.begin().await.unwrap();
    holder
        .execute(Statement::from_sql_and_values(
            connection.get_database_backend(),
            "UPDATE products SET quantity = quantity WHERE id = ?",
            [a.id.into()],
        ))
        .await
        .unwrap();

    let result = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await;
    holder.rollback().await.unwrap();

    match result {
        Err(e) => {
            assert_eq!(e.code(), "STOCK_UPDATE_FAILED");
            assert!(matches!(e, AppError::StockUpdateFailed(id) if id == a.id));
        }
        Ok(placed) => panic!("checkout went through a held lock: {:?}", placed.order.id),
    }

    assert_eq!(shop.stock_of(a.id).await, 3);
    assert_eq!(
        shop.services.carts().cart(&shop.customer).await.unwrap().item_count,
        1
    );

    // Once the lock is gone the same cart checks out
    shop.services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();
    assert_eq!(shop.stock_of(a.id).await, 2);
}
