use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use finance_tracker_rs::{create_user, encode_jwt, initialize_db};

/// A utility for creating a test database for the REST API server of finance_tracker_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The secret to sign the printed bearer token with, must match the server's secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
}

/// Sample transactions as (description, amount, category name, days ago).
const SAMPLE_TRANSACTIONS: [(&str, f64, &str, i64); 8] = [
    ("Gaji bulanan", 8_500_000.0, "Lainnya", 40),
    ("Beli nasi ayam di warteg", -25_000.0, "Makanan & Minuman", 2),
    ("Gojek ke kantor", -18_000.0, "Transportasi", 3),
    ("Bayar listrik PLN", -350_000.0, "Tagihan", 10),
    ("Belanja bulanan di supermarket", -650_000.0, "Belanja", 12),
    ("Nonton bioskop", -50_000.0, "Hiburan", 20),
    ("Beli obat di apotek", -75_000.0, "Kesehatan", 35),
    ("Beli reksa dana", -1_000_000.0, "Investasi", 65),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("test", &conn)?;

    println!("Creating sample transactions...");
    let now = OffsetDateTime::now_utc();

    for (description, amount, category, days_ago) in SAMPLE_TRANSACTIONS {
        let category_id: i64 = conn.query_row(
            "SELECT id FROM category WHERE name = ?1 AND user_id IS NULL",
            (category,),
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO \"transaction\"
                (description, amount, transaction_date, user_id, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            (
                description,
                amount,
                now - Duration::days(days_ago),
                user.id.as_i64(),
                category_id,
                now,
            ),
        )?;
    }

    let token = encode_jwt(
        &user,
        &EncodingKey::from_secret(args.jwt_secret.as_bytes()),
        Duration::days(30),
    )?;

    println!("Success! Bearer token for user \"{}\":\n{token}", user.username);

    Ok(())
}
