//! # Seed Data Generator
//!
//! Populates a development database with numbered sales, purchase orders
//! and debt payments.
//!
//! ## Usage
//! ```bash
//! # 20 documents of each kind per day for the last 3 days (default)
//! cargo run -p koperasi-db --bin seed
//!
//! # Custom amount and span
//! cargo run -p koperasi-db --bin seed -- --count 200 --days 10
//!
//! # Specify database path (otherwise KOPERASI_DB_PATH, then ./koperasi_dev.db)
//! cargo run -p koperasi-db --bin seed -- --db ./data/koperasi.db
//! ```
//!
//! Every document goes through the repositories, so the seeded numbers are
//! exactly what the tills would have issued.

use chrono::{Duration, Local, NaiveDate};
use koperasi_core::{NewDebtPayment, NewPurchase, NewSale, SaleVariant};
use koperasi_db::{ConfigError, Database, DbConfig};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_DB_PATH: &str = "./koperasi_dev.db";

const SUPPLIERS: &[&str] = &[
    "UD Makmur",
    "CV Sumber Rejeki",
    "PT Tani Jaya",
    "Toko Grosir Berkah",
    "KUD Sejahtera",
];

const MEMBERS: usize = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut days: i64 = 3;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Koperasi Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Documents of each kind per day (default: 20)");
                println!("  -n, --days <N>     Number of days ending today (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: $KOPERASI_DB_PATH or ./koperasi_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = match db_path {
        Some(path) => DbConfig::new(path),
        None => match DbConfig::from_env() {
            Ok(config) => config,
            Err(ConfigError::MissingRequired(_)) => DbConfig::new(DEFAULT_DB_PATH),
            Err(err) => return Err(err.into()),
        },
    };

    info!(path = %config.database_path.display(), count, days, "Seeding documents");
    let db = Database::new(config).await?;

    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sales", existing);
        println!("  Skipping seed to avoid mixing runs.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let members: Vec<String> = (0..MEMBERS).map(|_| Uuid::new_v4().to_string()).collect();
    let today = Local::now().date_naive();
    let start = std::time::Instant::now();
    let mut created = 0usize;

    for offset in (0..days.max(1)).rev() {
        let date = today - Duration::days(offset);
        created += seed_day(&db, date, count, &members).await?;
        println!("  {} seeded", date);
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Created {} documents in {:?}", created, elapsed);
    println!(
        "  Sales: {}, purchases: {}, debt payments: {}",
        db.sales().count().await?,
        db.purchases().count().await?,
        db.debt_payments().count().await?
    );

    db.close().await;
    Ok(())
}

/// Creates `count` sales, purchases and payments dated `date`.
async fn seed_day(
    db: &Database,
    date: NaiveDate,
    count: usize,
    members: &[String],
) -> Result<usize, Box<dyn std::error::Error>> {
    for n in 0..count {
        // Roughly one credit sale in three.
        let credit = n % 3 == 2;
        let member = &members[n % members.len()];

        db.sales()
            .create(NewSale {
                variant: if credit {
                    SaleVariant::Credit
                } else {
                    SaleVariant::Cash
                },
                sale_date: Some(date),
                member_id: credit.then(|| member.clone()),
                total_cents: 5_000 + (n as i64 * 1_750) % 250_000,
                notes: None,
            })
            .await?;

        db.purchases()
            .create(NewPurchase {
                purchase_date: date,
                supplier_name: SUPPLIERS[n % SUPPLIERS.len()].to_string(),
                total_cents: 500_000 + (n as i64 * 37_500) % 5_000_000,
                notes: None,
            })
            .await?;

        db.debt_payments()
            .create(NewDebtPayment {
                payment_date: date,
                member_id: member.clone(),
                amount_cents: 10_000 + (n as i64 * 2_500) % 100_000,
                notes: Some("angsuran".to_string()),
            })
            .await?;
    }

    Ok(count * 3)
}
