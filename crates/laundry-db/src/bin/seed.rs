//! # Seed Data Generator
//!
//! Populates the database with a starter shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/laundry.db with the default admin account
//! cargo run -p laundry-db --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p laundry-db --bin seed -- --db ./dev.db --admin owner --password s3cret!
//!
//! # Also create sample transactions spread over the last 120 days
//! cargo run -p laundry-db --bin seed -- --transactions 200
//! ```
//!
//! ## Generated Data
//! - One admin account plus one cashier and one owner
//! - Two outlets with a package list each
//! - A handful of members
//! - Optional sample transactions (mixed statuses, roughly two thirds paid)

use chrono::{Duration, Utc};
use laundry_core::invoice::DiscountType;
use laundry_core::{
    Gender, MemberInput, NewTransaction, NewTransactionItem, OutletInput, Package,
    PackageCategory, PackageInput, PaymentStatus, Role, TransactionStatus, UserInput,
};
use laundry_db::{Database, DbConfig};
use std::env;

const OUTLETS: &[(&str, &str, &str)] = &[
    ("SmartLaundry Pusat", "Jl. Merdeka No. 10, Bandung", "022-7201122"),
    ("SmartLaundry Dago", "Jl. Ir. H. Juanda No. 88, Bandung", "022-2503344"),
];

const PACKAGES: &[(&str, PackageCategory, f64)] = &[
    ("Kiloan Reguler", PackageCategory::PerKilo, 7_000.0),
    ("Kiloan Express", PackageCategory::PerKilo, 12_000.0),
    ("Selimut", PackageCategory::Blanket, 25_000.0),
    ("Bed Cover Besar", PackageCategory::BedCover, 35_000.0),
    ("Kaos Satuan", PackageCategory::TShirt, 5_000.0),
    ("Sepatu", PackageCategory::Other, 30_000.0),
];

const MEMBERS: &[(&str, Gender, &str)] = &[
    ("Budi Santoso", Gender::Male, "081234567801"),
    ("Siti Rahmawati", Gender::Female, "081234567802"),
    ("Agus Wijaya", Gender::Male, "081234567803"),
    ("Dewi Lestari", Gender::Female, "081234567804"),
    ("Rina Marlina", Gender::Female, "081234567805"),
];

const STATUSES: &[TransactionStatus] = &[
    TransactionStatus::New,
    TransactionStatus::InProgress,
    TransactionStatus::Done,
    TransactionStatus::PickedUp,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/laundry.db");
    let mut admin_username = String::from("admin");
    let mut admin_password = String::from("admin123");
    let mut transactions: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin" | "-a" => {
                if i + 1 < args.len() {
                    admin_username = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--transactions" | "-t" => {
                if i + 1 < args.len() {
                    transactions = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SmartLaundry Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./data/laundry.db)");
                println!("  -a, --admin <USERNAME>   Admin username (default: admin)");
                println!("  -p, --password <PASS>    Admin password (default: admin123)");
                println!("  -t, --transactions <N>   Sample transactions to create (default: 0)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SmartLaundry Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let (applied, total) = laundry_db::migrations::migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Outlets and their packages
    let mut outlet_ids = Vec::new();
    let mut packages: Vec<Package> = Vec::new();
    for (name, address, phone) in OUTLETS {
        let outlet = db
            .outlets()
            .create(&OutletInput {
                name: name.to_string(),
                address: Some(address.to_string()),
                phone: Some(phone.to_string()),
            })
            .await?;

        for (package_name, category, price) in PACKAGES {
            let package = db
                .packages()
                .create(&PackageInput {
                    outlet_id: outlet.id.clone(),
                    name: package_name.to_string(),
                    category: *category,
                    price: *price,
                })
                .await?;
            packages.push(package);
        }

        outlet_ids.push(outlet.id);
    }
    println!("✓ Created {} outlets, {} packages", outlet_ids.len(), packages.len());

    // Accounts
    let admin = db
        .users()
        .create(&UserInput {
            name: "Administrator".to_string(),
            username: admin_username.clone(),
            password: Some(admin_password),
            role: Role::Admin,
            outlet_id: None,
        })
        .await?;
    for (name, username, role) in [("Kasir Pusat", "kasir", Role::Cashier), ("Pemilik", "owner", Role::Owner)] {
        db.users()
            .create(&UserInput {
                name: name.to_string(),
                username: username.to_string(),
                password: Some("laundry123".to_string()),
                role,
                outlet_id: outlet_ids.first().cloned(),
            })
            .await?;
    }
    println!("✓ Created admin account '{}' (+ kasir, owner)", admin_username);

    // Members
    let mut member_ids = Vec::new();
    for (name, gender, phone) in MEMBERS {
        let member = db
            .members()
            .create(&MemberInput {
                name: name.to_string(),
                address: None,
                gender: Some(*gender),
                phone: Some(phone.to_string()),
            })
            .await?;
        member_ids.push(member.id);
    }
    println!("✓ Created {} members", member_ids.len());

    if transactions > 0 {
        println!();
        println!("Generating transactions...");
        let start = std::time::Instant::now();
        let now = Utc::now();
        let mut generated = 0;

        for seed in 0..transactions {
            let outlet_id = &outlet_ids[seed % outlet_ids.len()];
            let outlet_packages: Vec<Package> = packages
                .iter()
                .filter(|p| &p.outlet_id == outlet_id)
                .cloned()
                .collect();

            let request = sample_transaction(seed, outlet_id, &outlet_packages, &member_ids);
            // Offset by seed seconds so invoice codes stay unique
            let created_at = now
                - Duration::hours(((seed * 37) % (120 * 24)) as i64)
                - Duration::seconds(seed as i64);

            let detail = match request.build(&outlet_packages, Some(admin.id.clone()), created_at) {
                Ok(detail) => detail,
                Err(e) => {
                    eprintln!("Failed to build transaction {}: {}", seed, e);
                    continue;
                }
            };

            if let Err(e) = db.transactions().insert(&detail).await {
                eprintln!("Failed to insert {}: {}", detail.transaction.invoice_code, e);
                continue;
            }

            generated += 1;
        }

        println!("✓ Generated {} transactions in {:?}", generated, start.elapsed());
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a deterministic sample transaction request.
fn sample_transaction(
    seed: usize,
    outlet_id: &str,
    packages: &[Package],
    member_ids: &[String],
) -> NewTransaction {
    let line_count = 1 + seed % 3;
    let items = (0..line_count)
        .map(|line| {
            let package = &packages[(seed + line * 5) % packages.len()];
            let quantity = match package.category {
                PackageCategory::PerKilo => 1.5 + ((seed + line) % 8) as f64 * 0.5,
                _ => (1 + (seed + line) % 3) as f64,
            };
            NewTransactionItem {
                package_id: package.id.clone(),
                quantity,
                note: None,
            }
        })
        .collect();

    // Every fourth order is a walk-in customer
    let member_id = (seed % 4 != 0).then(|| member_ids[seed % member_ids.len()].clone());

    NewTransaction {
        outlet_id: outlet_id.to_string(),
        member_id,
        due_at: None,
        additional_fee: if seed % 5 == 0 { 5_000.0 } else { 0.0 },
        discount: if seed % 6 == 0 { 10.0 } else { 0.0 },
        discount_type: DiscountType::Percent,
        tax_percent: None,
        status: Some(STATUSES[seed % STATUSES.len()]),
        payment_status: Some(if seed % 3 == 0 {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Paid
        }),
        items,
    }
}
