//! Concurrent issuers against a file-backed SQLite database.
//!
//! In-memory databases are per-connection, so these tests use a real file in
//! a temporary directory to get several connections onto one database.

use std::collections::HashSet;

use chrono::NaiveDate;
use koperasi_core::{NewPurchase, NewSale, NumberRequest, SaleVariant};
use koperasi_db::{Database, DbConfig};
use tempfile::TempDir;

const WORKERS: usize = 8;

async fn file_database(connections: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("koperasi.db")).max_connections(connections);
    let db = Database::new(config).await.unwrap();
    (dir, db)
}

fn oct15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
}

fn running_count(number: &str) -> u32 {
    let digits = number
        .rsplit('-')
        .next()
        .unwrap()
        .trim_end_matches([' ', 'T', 'K']);
    digits.parse().unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_get_distinct_consecutive_numbers() {
    let (_dir, db) = file_database(WORKERS as u32).await;

    let mut handles = Vec::with_capacity(WORKERS);
    for n in 0..WORKERS {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.purchases()
                .create(NewPurchase {
                    purchase_date: oct15(),
                    supplier_name: format!("Supplier {n}"),
                    total_cents: 100_000,
                    notes: None,
                })
                .await
                .unwrap()
                .number
        }));
    }

    let mut numbers = Vec::with_capacity(WORKERS);
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }

    let unique: HashSet<&String> = numbers.iter().collect();
    assert_eq!(unique.len(), WORKERS, "duplicate numbers: {numbers:?}");

    let mut counts: Vec<u32> = numbers.iter().map(|n| running_count(n)).collect();
    counts.sort_unstable();
    assert_eq!(counts, (1..=WORKERS as u32).collect::<Vec<_>>());
    assert_eq!(db.purchases().count().await.unwrap(), WORKERS as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cash_and_credit_sales_count_independently() {
    let (_dir, db) = file_database(WORKERS as u32).await;
    let member = uuid::Uuid::new_v4().to_string();

    let mut handles = Vec::with_capacity(WORKERS);
    for n in 0..WORKERS {
        let db = db.clone();
        let member = member.clone();
        handles.push(tokio::spawn(async move {
            let variant = if n % 2 == 0 {
                SaleVariant::Cash
            } else {
                SaleVariant::Credit
            };
            let sale = db
                .sales()
                .create(NewSale {
                    variant,
                    sale_date: Some(oct15()),
                    member_id: Some(member),
                    total_cents: 12_500,
                    notes: None,
                })
                .await
                .unwrap();
            (variant, sale.number)
        }));
    }

    let mut cash = Vec::new();
    let mut credit = Vec::new();
    for handle in handles {
        let (variant, number) = handle.await.unwrap();
        match variant {
            SaleVariant::Cash => {
                assert!(number.ends_with(" T"), "{number}");
                cash.push(running_count(&number));
            }
            SaleVariant::Credit => {
                assert!(number.ends_with(" K"), "{number}");
                credit.push(running_count(&number));
            }
        }
    }

    cash.sort_unstable();
    credit.sort_unstable();
    let half: Vec<u32> = (1..=(WORKERS / 2) as u32).collect();
    assert_eq!(cash, half);
    assert_eq!(credit, half);
}

/// The unlocked fallback keeps issuance live while another transaction holds
/// the scope, at the price of possibly repeating its uncommitted number.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lock_timeout_falls_back_instead_of_failing() {
    let (_dir, db) = file_database(2).await;
    let generator = db.sequence_generator();
    let request = NumberRequest::purchase(oct15());

    let mut holder = db.begin().await.unwrap();
    let held = db
        .purchases()
        .create_in(
            &mut holder,
            NewPurchase {
                purchase_date: oct15(),
                supplier_name: "UD Makmur".to_string(),
                total_cents: 100_000,
                notes: None,
            },
        )
        .await
        .unwrap();

    let mut waiter = db.begin().await.unwrap();
    let started = std::time::Instant::now();
    let fallback = generator.next(Some(&mut waiter), &request).await.unwrap();

    assert!(started.elapsed() >= std::time::Duration::from_secs(4));
    assert_eq!(fallback, held.number);

    waiter.rollback().await.unwrap();
    holder.commit().await.unwrap();
}
