//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::money::from_cents;
use crate::domain::{Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTimeUtc,
    pub total_cents: i64,
    pub status: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub customer_address: String,
    pub delivery_price_cents: Option<i64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        let status = model.status.parse().unwrap_or_else(|_| {
            tracing::warn!(
                order_id = model.id,
                "Unknown stored order status {:?}, reading as PENDING",
                model.status
            );
            OrderStatus::Pending
        });

        Order {
            id: model.id,
            user_id: model.user_id,
            order_date: model.order_date,
            total_amount: from_cents(model.total_cents),
            status,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            customer_email: model.customer_email,
            customer_address: model.customer_address,
            delivery_price: model.delivery_price_cents.map(from_cents),
            payment_method: model.payment_method,
            notes: model.notes,
        }
    }
}
