//! # Seed Data Generator
//!
//! Populates the database with demo tours for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 tours in the current month (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tally-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Roughly one tour in three closes. Sale amounts run from $8,000 to
//! $60,000, about a quarter of sales are TRUST, and every tenth sale is
//! cancelled.

use chrono::{Datelike, NaiveDate, Utc};
use std::env;
use tally_core::aggregate::totals_of;
use tally_core::entry::{price_draft, DraftOutcome, SaleDraft};
use tally_core::{ManagerName, Money, Points, SaleType, TrustPoints};
use tally_db::{Database, DbConfig};
use uuid::Uuid;

const CLIENTS: &[&str] = &[
    "Anderson", "Baker", "Carter", "Diaz", "Evans", "Foster", "Garcia", "Hughes", "Iverson",
    "Jensen", "Kim", "Lopez", "Morgan", "Nguyen", "Ortiz", "Patel", "Quinn", "Reyes", "Sato",
    "Turner",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of tours to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Tours:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let project = db.projects().ensure_current().await?;
    println!("✓ Connected, project \"{}\"", project.name);

    let existing = db.sales().count_by_project(&project.id).await?;
    if existing > 0 {
        println!("⚠ Project already has {} records", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);
    let mut inserted = Vec::with_capacity(count);

    for seed in 0..count {
        let draft = generate_draft(seed, month_start);
        let refs: Vec<_> = inserted.iter().collect();
        let volume = totals_of(&refs).total_volume;
        let outcome = price_draft(&draft, volume, &project.commission_levels);
        let record = draft.into_record(
            Uuid::new_v4().to_string(),
            project.id.clone(),
            outcome,
            Utc::now(),
        );

        if let Err(e) = db.sales().insert(&record).await {
            eprintln!("Failed to insert tour {}: {}", seed, e);
            continue;
        }
        inserted.push(record);
    }

    let refs: Vec<_> = inserted.iter().collect();
    let totals = totals_of(&refs);
    println!();
    println!("✓ Generated {} tours", inserted.len());
    println!("  Active sales: {}", totals.active_sales);
    println!("  Volume:       {}", totals.total_volume.to_grouped_string());
    println!("  Monthly VPG:  {}", totals.monthly_vpg.to_grouped_string());

    Ok(())
}

/// Builds one deterministic demo tour.
fn generate_draft(seed: usize, month_start: NaiveDate) -> SaleDraft {
    let day = (seed * 7 % 28) as u64;
    let date = month_start
        .checked_add_days(chrono::Days::new(day))
        .unwrap_or(month_start);
    let tours = 1 + (seed % 3) as u32;

    let outcome = if seed % 3 == 0 {
        let sale_type = if seed % 4 == 0 {
            SaleType::Trust
        } else {
            SaleType::Deed
        };
        let dollars = 8_000 + ((seed * 3_719) % 52_000) as i64;
        let trust_points = match sale_type {
            SaleType::Trust => TrustPoints {
                existing: Points::from_whole((seed % 5 * 1_000) as i64),
                new: Points::from_whole(dollars / 10),
            },
            SaleType::Deed => TrustPoints::default(),
        };
        DraftOutcome::Sale {
            client_last_name: CLIENTS[seed % CLIENTS.len()].to_string(),
            manager: ManagerName::ALL[seed % (ManagerName::ALL.len() - 1)],
            sale_type,
            sale_amount: Money::from_dollars(dollars),
            fdi_given_points: Points::from_whole((dollars * 55 / 100) + (seed % 2 * 500) as i64),
            trust_points,
        }
    } else {
        DraftOutcome::NoSale
    };

    SaleDraft {
        date,
        tours,
        lead_number: format!("L-{:04}", 1000 + seed),
        notes: String::new(),
        is_cancelled: seed % 30 == 9,
        outcome,
    }
}
