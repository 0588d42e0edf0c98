//! Sales analytics over real orders.

mod common;

use chrono::Utc;
use futures::StreamExt;
use rust_decimal::Decimal;

use common::{checkout, shop, shop_with, test_config, Shop};
use shopkeeper::domain::{
    AnalyticsOutcome, Category, OrderStatus, ProductUpdate, RevenueBasis,
};
use shopkeeper::services::ServiceContainer;

/// Place one order for `quantity` of `product_id` and move it to `status`.
async fn sell(shop: &Shop, product_id: i64, quantity: i32, status: OrderStatus) -> i64 {
    shop.add_to_cart(&shop.customer, product_id, quantity).await;
    let details = shop
        .services
        .orders()
        .place_order(&shop.customer, checkout())
        .await
        .unwrap();
    if status != OrderStatus::Pending {
        shop.services
            .orders()
            .update_status(&shop.manager, details.order.id, status)
            .await
            .unwrap();
    }
    details.order.id
}

#[tokio::test]
async fn test_empty_shop_reports_empty() {
    let shop = shop().await;
    let analytics = shop.services.analytics();

    assert_eq!(analytics.top_selling(5).await, AnalyticsOutcome::Empty);
    assert_eq!(analytics.summary().await, AnalyticsOutcome::Empty);

    let sales = analytics.sales_by_category().await.ready().expect("every category");
    assert_eq!(sales.len(), Category::ALL.len());
    for category in Category::ALL {
        assert_eq!(sales.get(category), Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_category_sales_count_only_delivered_orders() {
    let shop = shop().await;
    let shoes = shop.product("Runner", 60, 10, Category::Shoes).await;
    let book = shop.product("Atlas", 20, 10, Category::Books).await;

    sell(&shop, shoes.id, 2, OrderStatus::Delivered).await;
    sell(&shop, book.id, 3, OrderStatus::Cancelled).await;
    sell(&shop, book.id, 1, OrderStatus::Shipped).await;

    let sales = shop
        .services
        .analytics()
        .sales_by_category()
        .await
        .ready()
        .expect("sales");

    assert_eq!(sales.len(), Category::ALL.len());
    assert_eq!(sales.get(Category::Shoes), Decimal::from(120));
    assert_eq!(sales.get(Category::Books), Decimal::ZERO);
    assert_eq!(sales.get(Category::Electronics), Decimal::ZERO);
    assert_eq!(sales.total(), Decimal::from(120));
}

#[tokio::test]
async fn test_category_revenue_basis() {
    let mut config = test_config();
    config.category_revenue_basis = RevenueBasis::Snapshot;
    let snapshot = shop_with(config).await;
    let live = shop().await;

    for shop in [&snapshot, &live] {
        let lamp = shop.product("Lamp", 30, 5, Category::Home).await;
        sell(shop, lamp.id, 2, OrderStatus::Delivered).await;
        shop.services
            .products()
            .update_product(
                &shop.manager,
                lamp.id,
                ProductUpdate {
                    price: Some(Decimal::from(45)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let by_snapshot = snapshot.services.analytics().sales_by_category().await.ready().unwrap();
    let by_live = live.services.analytics().sales_by_category().await.ready().unwrap();

    assert_eq!(by_snapshot.get(Category::Home), Decimal::from(60));
    assert_eq!(by_live.get(Category::Home), Decimal::from(90));
}

#[tokio::test]
async fn test_top_sellers_ranked_by_units() {
    let shop = shop().await;
    let a = shop.product("Mug", 8, 20, Category::Home).await;
    let b = shop.product("Cap", 15, 20, Category::Accessories).await;
    let c = shop.product("Socks", 5, 20, Category::Clothing).await;

    sell(&shop, a.id, 2, OrderStatus::Pending).await;
    sell(&shop, b.id, 5, OrderStatus::Delivered).await;
    sell(&shop, a.id, 1, OrderStatus::Pending).await;
    sell(&shop, c.id, 1, OrderStatus::Pending).await;

    let top = shop.services.analytics().top_selling(2).await.ready().unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].product.id, b.id);
    assert_eq!(top[0].quantity_sold, 5);
    assert_eq!(top[0].revenue, Decimal::from(75));
    assert_eq!(top[1].product.id, a.id);
    assert_eq!(top[1].quantity_sold, 3);
    assert_eq!(top[1].revenue, Decimal::from(24));
}

#[tokio::test]
async fn test_summary_and_daily_sales() {
    let shop = shop().await;
    let a = shop.product("Kettle", 40, 10, Category::Home).await;

    sell(&shop, a.id, 1, OrderStatus::Delivered).await;
    sell(&shop, a.id, 2, OrderStatus::Delivered).await;
    sell(&shop, a.id, 1, OrderStatus::Pending).await;

    let analytics = shop.services.analytics();
    let summary = analytics.summary().await.ready().unwrap();
    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.delivered_orders, 2);
    assert_eq!(summary.delivered_revenue, Decimal::from(120));
    assert_eq!(summary.average_order_value, Decimal::from(60));

    let today = Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();
    let days = analytics.daily_sales(yesterday, today).await.ready().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].order_count, 0);
    assert_eq!(days[1].order_count, 2);
    assert_eq!(days[1].revenue, Decimal::from(120));

    assert!(analytics.daily_sales(today, yesterday).await.is_failed());
}

#[tokio::test]
async fn test_category_stream_follows_deliveries() {
    let shop = shop().await;
    let a = shop.product("Puzzle", 12, 10, Category::Other).await;
    let order_id = sell(&shop, a.id, 2, OrderStatus::Pending).await;

    let mut stream = shop.services.analytics().watch_sales_by_category();
    let initial = stream.next().await.and_then(AnalyticsOutcome::ready).unwrap();
    assert_eq!(initial.len(), Category::ALL.len());
    assert_eq!(initial.total(), Decimal::ZERO);

    shop.services
        .orders()
        .update_status(&shop.manager, order_id, OrderStatus::Delivered)
        .await
        .unwrap();

    let updated = stream.next().await.and_then(AnalyticsOutcome::ready).unwrap();
    assert_eq!(updated.get(Category::Other), Decimal::from(24));
}
