use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{Entity, MovementType};

use crate::schema::{books, inventorymovements, inventorys};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Book {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub isbn: String,
    pub published_date: NaiveDateTime,
    pub description: Option<String>,
}

/// Writable columns of a book. Used for inserts and full-row updates, so a
/// `None` description clears the stored value.
#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = books)]
#[diesel(treat_none_as_null = true)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub published_date: NaiveDateTime,
    pub description: Option<String>,
}

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(table_name = inventorys)]
#[diesel(belongs_to(Book))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Inventory {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stock: i32,
    pub book_id: i32,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = inventorys)]
pub struct NewInventory {
    pub stock: i32,
    pub book_id: i32,
}

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(table_name = inventorymovements)]
#[diesel(belongs_to(Inventory))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryMovement {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub quantity: i32,
    pub movement_type: MovementType,
    pub inventory_id: i32,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = inventorymovements)]
pub struct NewInventoryMovement {
    pub quantity: i32,
    pub movement_type: MovementType,
    pub inventory_id: i32,
}

impl Inventory {
    /// Whether the stored stock equals a signed movement total.
    pub fn reconciles_with(&self, balance: i64) -> bool {
        i64::from(self.stock) == balance
    }
}

impl InventoryMovement {
    pub fn signed_quantity(&self) -> i64 {
        self.movement_type.signed(self.quantity)
    }
}

macro_rules! impl_entity {
    ($($model:ident),+ $(,)?) => {
        $(
            impl Entity for $model {
                const TYPE_NAME: &'static str = stringify!($model);

                fn id(&self) -> i32 {
                    self.id
                }

                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }

                fn updated_at(&self) -> DateTime<Utc> {
                    self.updated_at
                }
            }
        )+
    };
}

impl_entity!(Book, Inventory, InventoryMovement);
