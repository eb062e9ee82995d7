//! # Seed Data Generator
//!
//! Populates the database with demo reconciliation history for development.
//!
//! ## Usage
//! ```bash
//! # Generate 10 closed sessions (default)
//! cargo run -p till-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p till-db --bin seed -- --sessions 30
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated History
//! One demo register per run target, then a sequence of open → record →
//! close cycles with deterministic pseudo-random sales across payment
//! methods. Every fourth session closes short by $1.00 so variance
//! reporting has something to show.

use std::env;

use till_core::{CountedAmounts, MovementType, NewMovement, PaymentMethod};
use till_db::{Database, DbConfig};

/// Movement descriptions for realistic demo rows.
const DESCRIPTIONS: &[&str] = &[
    "Dine-in order",
    "Takeaway order",
    "Delivery order",
    "Counter sale",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut sessions: usize = 10;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sessions" | "-s" => {
                if i + 1 < args.len() {
                    sessions = args[i + 1].parse().unwrap_or(10);
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
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sessions <N>  Number of closed sessions (default: 10)");
                println!("  -d, --db <PATH>     Database file path (default: ./till_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Sessions: {}", sessions);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Reuse the demo register across runs so history accumulates.
    let register = match db
        .registers()
        .list_by_branch("branch-demo")
        .await?
        .into_iter()
        .next()
    {
        Some(existing) => existing,
        None => {
            db.registers()
                .create("tenant-demo", "branch-demo", "Front counter")
                .await?
        }
    };
    println!("✓ Register: {} ({})", register.name, register.id);
    println!();

    let start = std::time::Instant::now();

    for n in 0..sessions {
        let initial_cash = 5_000 + ((n * 37) % 50) as i64 * 100;
        let session = db
            .sessions()
            .open(&register.id, initial_cash, "seed-cashier", None)
            .await?;

        let mut cash_sales = 0_i64;
        let mut card_sales = 0_i64;

        let movement_count = 3 + (n * 7) % 6;
        for m in 0..movement_count {
            let seed = n * 100 + m;
            let amount_cents = 250 + ((seed * 53) % 40) as i64 * 25;
            let payment_method = if seed % 3 == 0 {
                PaymentMethod::Card
            } else {
                PaymentMethod::Cash
            };

            db.movements()
                .record(
                    &register.id,
                    NewMovement {
                        movement_type: MovementType::Sale,
                        amount_cents,
                        payment_method,
                        category: None,
                        description: DESCRIPTIONS[seed % DESCRIPTIONS.len()].to_string(),
                        order_id: Some(format!("order-{seed}")),
                    },
                )
                .await?;

            match payment_method {
                PaymentMethod::Cash => cash_sales += amount_cents,
                _ => card_sales += amount_cents,
            }
        }

        // Every fourth drawer comes up $1.00 short.
        let shortfall = if n % 4 == 3 { 100 } else { 0 };
        let counted = CountedAmounts {
            cash_cents: initial_cash + cash_sales - shortfall,
            card_cents: card_sales,
            transfer_cents: 0,
            other_cents: 0,
        };

        let closed = db
            .sessions()
            .close(&session.id, counted, "seed-cashier", None)
            .await?;

        println!(
            "  Session {:>3}: {} movements, difference {}",
            n + 1,
            movement_count,
            closed.difference().unwrap_or_default()
        );
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} sessions in {:?}", sessions, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
