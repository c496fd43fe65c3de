//! # Seed Data Generator
//!
//! Populates the database with demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p basket-db --bin seed
//!
//! # Give every item a fixed stock level
//! cargo run -p basket-db --bin seed -- --stock 25
//!
//! # Specify database path
//! cargo run -p basket-db --bin seed -- --db ./data/basket.db
//! ```
//!
//! ## Generated Inventory
//! One record per catalog entry below. Stock defaults to a spread between
//! 0 and 50 so both checkout successes and `InsufficientStock` are easy to
//! reproduce by hand.

use std::env;

use basket_core::validation::{validate_item_name, validate_price_cents, validate_stock_quantity};
use basket_core::NewInventoryRecord;
use basket_db::migrations::migration_status;
use basket_db::{Database, DbConfig};

/// Demo catalog: (name, unit price in cents).
const CATALOG: &[(&str, i64)] = &[
    ("Widget", 250),
    ("Gadget", 1000),
    ("Gizmo", 1499),
    ("Sprocket", 75),
    ("Flange", 320),
    ("Doohickey", 899),
    ("Thingamajig", 1250),
    ("Whatsit", 199),
    ("Cog", 45),
    ("Lever", 560),
    ("Pulley", 1875),
    ("Spring", 30),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut fixed_stock: Option<i64> = None;
    let mut db_path = String::from("./basket.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stock" | "-s" => {
                let value = args.get(i + 1).ok_or("--stock needs a value")?;
                fixed_stock = Some(parse_stock(value)?);
                i += 1;
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Basket Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stock <N>    Stock level for every item (default: varied 0-50)");
                println!("  -d, --db <PATH>    Database file path (default: ./basket.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Basket Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} inventory records", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    println!();
    println!("Generating inventory...");

    let mut generated = 0;
    for (index, (name, price_cents)) in CATALOG.iter().enumerate() {
        let record = generate_record(name, *price_cents, fixed_stock, index);

        if let Err(e) = validate_item_name(&record.name)
            .and_then(|_| validate_stock_quantity(record.quantity))
            .and_then(|_| validate_price_cents(record.unit_price_cents))
        {
            eprintln!("Skipping {}: {}", record.name, e);
            continue;
        }

        match db.inventory().insert(&record).await {
            Ok(stored) => {
                println!("  {:<12} qty {:>3}  {}", stored.name, stored.quantity, stored.unit_price());
                generated += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", record.name, e),
        }
    }

    println!();
    println!("✓ Seed complete! {} records", generated);

    db.close().await;
    Ok(())
}

/// Parses a `--stock` value: a non-negative whole number.
fn parse_stock(value: &str) -> Result<i64, String> {
    let stock: i64 = value
        .parse()
        .map_err(|_| format!("invalid --stock value '{}': expected a whole number", value))?;
    validate_stock_quantity(stock).map_err(|e| format!("invalid --stock value '{}': {}", value, e))?;
    Ok(stock)
}

/// Builds one record, spreading stock levels when no fixed level was given.
fn generate_record(
    name: &str,
    price_cents: i64,
    fixed_stock: Option<i64>,
    index: usize,
) -> NewInventoryRecord {
    let quantity = fixed_stock.unwrap_or(((index * 17) % 51) as i64);

    NewInventoryRecord {
        name: name.to_string(),
        quantity,
        unit_price_cents: price_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("25"), Ok(25));
        assert_eq!(parse_stock("0"), Ok(0));

        assert!(parse_stock("lots").unwrap_err().contains("lots"));
        assert!(parse_stock("-3").is_err());
        assert!(parse_stock("").is_err());
    }

    #[test]
    fn test_generate_record_spreads_stock() {
        assert_eq!(generate_record("Widget", 250, Some(7), 3).quantity, 7);

        let spread: Vec<i64> = (0..CATALOG.len())
            .map(|i| generate_record("Widget", 250, None, i).quantity)
            .collect();
        assert!(spread.iter().all(|q| (0..=50).contains(q)));
        assert!(spread.iter().any(|q| *q != spread[0]));
    }
}
