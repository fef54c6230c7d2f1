use book_inventory::{run_migrations_blocking, Database, NewBook};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Connects to the database named by `TEST_DATABASE_URL` after applying
/// migrations once per test binary. Panics when the variable is unset; the
/// tests calling this are `#[ignore]`d and run with `cargo test -- --ignored`.
pub async fn test_db() -> Database {
    let url = std::env::var("TEST_DATABASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .expect("TEST_DATABASE_URL must be set to run database tests");

    static MIGRATED: OnceLock<()> = OnceLock::new();
    let migrate_url = url.clone();
    tokio::task::spawn_blocking(move || {
        MIGRATED.get_or_init(|| {
            run_migrations_blocking(&migrate_url).expect("migrations should apply");
        });
    })
    .await
    .unwrap();

    Database::from_url(&url).await.expect("pool should build")
}

/// A 13 character ISBN that no other test in this run uses.
pub fn unique_isbn() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64;
    let seq = SEQ.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("{:013}", (micros % 10_000_000_000) * 1000 + seq)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn new_book(title: &str, isbn: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        isbn: isbn.to_string(),
        published_date: date(2001, 1, 1),
        description: None,
    }
}
