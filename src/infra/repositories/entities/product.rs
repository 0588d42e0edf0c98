//! Product database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::money::from_cents;
use crate::domain::{Category, Product};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category: String,
    pub image_url: String,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::favorite_item::Entity")]
    FavoriteItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::favorite_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        let category = model.category.parse().unwrap_or_else(|_| {
            tracing::warn!(
                product_id = model.id,
                "Unknown stored category {:?}, reading as OTHER",
                model.category
            );
            Category::Other
        });

        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: from_cents(model.price_cents),
            category,
            image_url: model.image_url,
            quantity: model.quantity,
            size: model.size,
            color: model.color,
        }
    }
}
