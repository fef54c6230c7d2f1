diesel::table! {
    books (id) {
        id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        title -> Varchar,
        isbn -> Varchar,
        published_date -> Timestamp,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    inventorys (id) {
        id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        stock -> Int4,
        book_id -> Int4,
    }
}

diesel::table! {
    inventorymovements (id) {
        id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        quantity -> Int4,
        movement_type -> Varchar,
        inventory_id -> Int4,
    }
}

diesel::joinable!(inventorys -> books (book_id));
diesel::joinable!(inventorymovements -> inventorys (inventory_id));

diesel::allow_tables_to_appear_in_same_query!(
    books,
    inventorys,
    inventorymovements,
);
