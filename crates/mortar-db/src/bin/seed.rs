//! # Seed Data Generator
//!
//! Populates a database with a demo building-materials catalog, a few
//! clients and suppliers, and optionally some transaction history.
//!
//! ## Usage
//! ```bash
//! # Catalog and parties only
//! cargo run -p mortar-db --bin seed
//!
//! # Also record one purchase per supplier and a few sales
//! cargo run -p mortar-db --bin seed -- --history
//!
//! # Specify database path
//! cargo run -p mortar-db --bin seed -- --db ./data/mortar.db
//! ```
//!
//! Products are filed under the default categories created by the
//! migrations (Briques, Ciment, Peinture, ...). Prices are in centimes.

use std::env;

use mortar_core::{
    PartyInput, ProductInput, PurchaseDraft, PurchaseLineRequest, SaleDraft, SaleLineRequest,
};
use mortar_db::{Database, DbConfig};

/// (category, name, purchase price, sale price, quantity, reorder threshold)
const PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Briques", "Brique creuse 8 trous", 2_200, 3_000, 4_000, 500),
    ("Briques", "Brique creuse 12 trous", 3_000, 4_000, 2_500, 500),
    ("Briques", "Parpaing 20x20x40", 5_500, 7_000, 1_200, 200),
    ("Ciment", "Ciment CPJ 42.5 (sac 50kg)", 90_000, 115_000, 120, 20),
    ("Ciment", "Ciment CRS (sac 50kg)", 110_000, 140_000, 40, 10),
    ("Ciment", "Chaux hydratée (sac 25kg)", 45_000, 60_000, 8, 10),
    ("Peinture", "Peinture vinylique blanche 25kg", 380_000, 480_000, 15, 5),
    ("Peinture", "Enduit de lissage 25kg", 150_000, 200_000, 3, 5),
    ("Bois", "Chevron sapin 6x8 (4m)", 80_000, 105_000, 60, 10),
    ("Bois", "Contreplaqué 18mm", 420_000, 520_000, 12, 4),
    ("Métal", "Rond à béton HA12 (12m)", 150_000, 185_000, 300, 50),
    ("Métal", "Treillis soudé 2.4x6", 390_000, 470_000, 25, 10),
    ("Électricité", "Câble rigide 2.5mm² (100m)", 520_000, 650_000, 9, 5),
    ("Électricité", "Disjoncteur 16A", 45_000, 65_000, 40, 10),
    ("Plomberie", "Tube PVC 100 (4m)", 95_000, 125_000, 35, 10),
    ("Plomberie", "Robinet d'arrêt 20/27", 60_000, 85_000, 2, 5),
];

/// (name, address, phone)
const CLIENTS: &[(&str, &str, &str)] = &[
    ("SARL Bâtir Plus", "Zone industrielle, Rouiba", "0550 11 22 33"),
    ("Entreprise Benali Frères", "Cité 500 logements, Oran", "0661 44 55 66"),
    ("M. Karim Haddad", "Rue des Frères Bouadou, Bir Mourad Raïs", "0770 98 76 54"),
];

/// (name, address, phone)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Cimenterie de Meftah", "Meftah, Blida", "025 45 10 10"),
    ("Briqueterie de l'Est", "Sétif", "036 84 20 20"),
    ("Quincaillerie Centrale", "Bab Ezzouar, Alger", "023 92 30 30"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mortar_dev.db");
    let mut history = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--history" => history = true,
            "--help" | "-h" => {
                println!("Mortar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mortar_dev.db)");
                println!("      --history      Also record sample purchases and sales");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mortar Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let categories = db.categories().list().await?;
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());

    for (category, name, purchase, sale, quantity, threshold) in PRODUCTS {
        let category_id = categories
            .iter()
            .find(|c| c.name == *category)
            .map(|c| c.id.clone());

        let product = db
            .products()
            .create(&ProductInput {
                name: name.to_string(),
                description: None,
                category_id,
                purchase_price_cents: *purchase,
                sale_price_cents: *sale,
                quantity: *quantity,
                reorder_threshold: Some(*threshold),
            })
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ Created {} products", product_ids.len());

    // Parties
    let mut client_ids = Vec::new();
    for (name, address, phone) in CLIENTS {
        let client = db.clients().create(&party(name, address, phone)).await?;
        client_ids.push(client.id);
    }

    let mut supplier_ids = Vec::new();
    for (name, address, phone) in SUPPLIERS {
        let supplier = db.suppliers().create(&party(name, address, phone)).await?;
        supplier_ids.push(supplier.id);
    }
    println!(
        "✓ Created {} clients and {} suppliers",
        client_ids.len(),
        supplier_ids.len()
    );

    if history {
        for (n, supplier_id) in supplier_ids.iter().enumerate() {
            let product_id = &product_ids[n * 3];
            let (_, _, purchase, _, _, _) = PRODUCTS[n * 3];
            db.purchases()
                .create(&PurchaseDraft {
                    supplier_id: supplier_id.clone(),
                    lines: vec![PurchaseLineRequest {
                        product_id: product_id.clone(),
                        quantity: 50,
                        unit_price_cents: purchase,
                    }],
                    notes: Some("Livraison initiale".to_string()),
                    purchased_at: None,
                })
                .await?;
        }

        for (n, client_id) in client_ids.iter().enumerate() {
            db.sales()
                .create(&SaleDraft {
                    client_id: client_id.clone(),
                    lines: vec![
                        SaleLineRequest {
                            product_id: product_ids[n].clone(),
                            quantity: 10 * (n as i64 + 1),
                        },
                        SaleLineRequest {
                            product_id: product_ids[3].clone(),
                            quantity: 2,
                        },
                    ],
                    notes: None,
                    sold_at: None,
                })
                .await?;
        }
        println!(
            "✓ Recorded {} purchases and {} sales",
            supplier_ids.len(),
            client_ids.len()
        );
    }

    let alerts = db.reports().low_stock().await?;
    println!();
    println!("Low stock after seeding: {}", alerts.len());
    for product in alerts {
        println!("  {} ({} / {})", product.name, product.quantity, product.reorder_threshold);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn party(name: &str, address: &str, phone: &str) -> PartyInput {
    PartyInput {
        name: name.to_string(),
        address: Some(address.to_string()),
        phone: Some(phone.to_string()),
        email: None,
        notes: None,
    }
}
