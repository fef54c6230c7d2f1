//! Reads and writes for books, their inventory and its movement history.
//!
//! Relationships are loaded explicitly: each navigation helper issues its own
//! query, and [`Session::book_with_inventory`] is the eager join. Cascades run
//! children first inside a single transaction.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use shared::MovementType;
use tracing::info;

use crate::db::Session;
use crate::error::{Result, StoreError};
use crate::models::*;
use crate::schema::*;

impl Session {
    pub async fn insert_book(&mut self, new_book: &NewBook) -> Result<Book> {
        let book = diesel::insert_into(books::table)
            .values(new_book)
            .returning(Book::as_returning())
            .get_result(self.conn())
            .await?;
        Ok(book)
    }

    pub async fn get_book(&mut self, id: i32) -> Result<Option<Book>> {
        let book = books::table
            .find(id)
            .select(Book::as_select())
            .first(self.conn())
            .await
            .optional()?;
        Ok(book)
    }

    pub async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>> {
        let book = books::table
            .filter(books::isbn.eq(isbn))
            .select(Book::as_select())
            .first(self.conn())
            .await
            .optional()?;
        Ok(book)
    }

    /// Overwrites every writable column of the book.
    pub async fn update_book(&mut self, id: i32, changes: &NewBook) -> Result<Book> {
        let book = diesel::update(books::table.find(id))
            .set(changes)
            .returning(Book::as_returning())
            .get_result(self.conn())
            .await?;
        Ok(book)
    }

    /// Deletes the book together with its inventory and that inventory's
    /// movements. Returns `false` if no such book exists.
    pub async fn delete_book(&mut self, id: i32) -> Result<bool> {
        self.transaction(move |conn| {
            Box::pin(async move {
                let inventory_ids: Vec<i32> = inventorys::table
                    .filter(inventorys::book_id.eq(id))
                    .select(inventorys::id)
                    .load(conn)
                    .await?;
                for inventory_id in inventory_ids {
                    delete_inventory_tree(conn, inventory_id).await?;
                }

                let deleted = diesel::delete(books::table.find(id)).execute(conn).await?;
                if deleted > 0 {
                    info!("Deleted book {}", id);
                }
                Ok::<_, StoreError>(deleted > 0)
            })
        })
        .await
    }

    pub async fn insert_inventory(&mut self, new_inventory: &NewInventory) -> Result<Inventory> {
        let inventory = diesel::insert_into(inventorys::table)
            .values(new_inventory)
            .returning(Inventory::as_returning())
            .get_result(self.conn())
            .await?;
        Ok(inventory)
    }

    pub async fn get_inventory(&mut self, id: i32) -> Result<Option<Inventory>> {
        let inventory = inventorys::table
            .find(id)
            .select(Inventory::as_select())
            .first(self.conn())
            .await
            .optional()?;
        Ok(inventory)
    }

    pub async fn update_stock(&mut self, id: i32, stock: i32) -> Result<Inventory> {
        let inventory = diesel::update(inventorys::table.find(id))
            .set(inventorys::stock.eq(stock))
            .returning(Inventory::as_returning())
            .get_result(self.conn())
            .await?;
        Ok(inventory)
    }

    /// Deletes the inventory and all of its movements.
    pub async fn delete_inventory(&mut self, id: i32) -> Result<bool> {
        self.transaction(move |conn| Box::pin(async move { delete_inventory_tree(conn, id).await }))
            .await
    }

    /// Attaches a fresh inventory to the book. Any inventory it had before is
    /// orphaned by the replacement and is deleted along with its movements.
    pub async fn replace_inventory(&mut self, book_id: i32, stock: i32) -> Result<Inventory> {
        self.transaction(move |conn| {
            Box::pin(async move {
                let previous: Option<i32> = inventorys::table
                    .filter(inventorys::book_id.eq(book_id))
                    .select(inventorys::id)
                    .first(conn)
                    .await
                    .optional()?;
                if let Some(previous_id) = previous {
                    delete_inventory_tree(conn, previous_id).await?;
                    info!("Replaced inventory {} of book {}", previous_id, book_id);
                }

                let inventory = diesel::insert_into(inventorys::table)
                    .values(&NewInventory { stock, book_id })
                    .returning(Inventory::as_returning())
                    .get_result(conn)
                    .await?;
                Ok::<_, StoreError>(inventory)
            })
        })
        .await
    }

    pub async fn insert_movement(
        &mut self,
        new_movement: &NewInventoryMovement,
    ) -> Result<InventoryMovement> {
        let movement = diesel::insert_into(inventorymovements::table)
            .values(new_movement)
            .returning(InventoryMovement::as_returning())
            .get_result(self.conn())
            .await?;
        Ok(movement)
    }

    pub async fn get_movement(&mut self, id: i32) -> Result<Option<InventoryMovement>> {
        let movement = inventorymovements::table
            .find(id)
            .select(InventoryMovement::as_select())
            .first(self.conn())
            .await
            .optional()?;
        Ok(movement)
    }

    /// Detaches a movement from its inventory. A detached movement has no
    /// owner, so it is deleted.
    pub async fn remove_movement(&mut self, inventory: &Inventory, movement_id: i32) -> Result<bool> {
        let deleted = diesel::delete(
            inventorymovements::table
                .filter(inventorymovements::inventory_id.eq(inventory.id))
                .filter(inventorymovements::id.eq(movement_id)),
        )
        .execute(self.conn())
        .await?;
        Ok(deleted > 0)
    }

    pub async fn inventory_of(&mut self, book: &Book) -> Result<Option<Inventory>> {
        let inventory = Inventory::belonging_to(book)
            .select(Inventory::as_select())
            .first(self.conn())
            .await
            .optional()?;
        Ok(inventory)
    }

    pub async fn book_of(&mut self, inventory: &Inventory) -> Result<Book> {
        let book = books::table
            .find(inventory.book_id)
            .select(Book::as_select())
            .first(self.conn())
            .await?;
        Ok(book)
    }

    pub async fn movements_of(&mut self, inventory: &Inventory) -> Result<Vec<InventoryMovement>> {
        let movements = InventoryMovement::belonging_to(inventory)
            .select(InventoryMovement::as_select())
            .order(inventorymovements::id.asc())
            .load(self.conn())
            .await?;
        Ok(movements)
    }

    pub async fn inventory_for(&mut self, movement: &InventoryMovement) -> Result<Inventory> {
        let inventory = inventorys::table
            .find(movement.inventory_id)
            .select(Inventory::as_select())
            .first(self.conn())
            .await?;
        Ok(inventory)
    }

    /// Loads a book and its inventory in one query.
    pub async fn book_with_inventory(&mut self, id: i32) -> Result<Option<(Book, Option<Inventory>)>> {
        let row = books::table
            .left_join(inventorys::table)
            .filter(books::id.eq(id))
            .select((books::all_columns, inventorys::all_columns.nullable()))
            .first::<(Book, Option<Inventory>)>(self.conn())
            .await
            .optional()?;
        Ok(row)
    }

    /// Signed total of the inventory's movements: additions count up,
    /// removals count down. Stock is not adjusted.
    pub async fn movement_balance(&mut self, inventory: &Inventory) -> Result<i64> {
        let rows: Vec<(MovementType, i32)> = InventoryMovement::belonging_to(inventory)
            .select((inventorymovements::movement_type, inventorymovements::quantity))
            .load(self.conn())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(movement_type, quantity)| movement_type.signed(quantity))
            .sum())
    }
}

async fn delete_inventory_tree(conn: &mut AsyncPgConnection, inventory_id: i32) -> Result<bool> {
    let movements = diesel::delete(
        inventorymovements::table.filter(inventorymovements::inventory_id.eq(inventory_id)),
    )
    .execute(conn)
    .await?;

    let deleted = diesel::delete(inventorys::table.find(inventory_id))
        .execute(conn)
        .await?;
    if deleted > 0 {
        info!(
            "Deleted inventory {} with {} movement(s)",
            inventory_id, movements
        );
    }
    Ok(deleted > 0)
}
