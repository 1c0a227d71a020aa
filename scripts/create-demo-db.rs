// Script to create a demo SQLite system store
// Run with: cargo run --bin create-demo-db

use rusqlite::{params, Connection};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One database file per system schema
    let db_path = PathBuf::from("demo/ACME_SCHEMA.db");

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Remove existing if present
    if db_path.exists() {
        std::fs::remove_file(&db_path)?;
    }

    let conn = Connection::open(&db_path)?;

    conn.execute_batch(
        r#"
        -- Data table whose columns are documented
        CREATE TABLE ACME_MAIN_TABLE (
            ORDER_ID INTEGER PRIMARY KEY,
            REGION TEXT NOT NULL,
            CHANNEL TEXT NOT NULL,
            AMOUNT REAL NOT NULL,
            ORDERED_AT TEXT NOT NULL
        );

        -- One row per documented column
        CREATE TABLE ACME_MAIN_TABLE_DESCRIPTION (
            COLUMN_NAME TEXT PRIMARY KEY,
            DATA_TYPE TEXT NOT NULL,
            UNIQUE_VALUES TEXT NOT NULL DEFAULT '',
            DESCRIPTION TEXT NOT NULL DEFAULT ''
        );

        -- Named generation prompts
        CREATE TABLE ACME_PROMPT_TABLE (
            NAME TEXT PRIMARY KEY,
            TEXT TEXT NOT NULL
        );
        "#,
    )?;

    let orders = [
        ("NORTH", "ONLINE", 120.5, "2024-01-03"),
        ("SOUTH", "STORE", 80.0, "2024-01-04"),
        ("NORTH", "STORE", 42.25, "2024-01-09"),
        ("WEST", "ONLINE", 310.0, "2024-02-11"),
        ("EAST", "PARTNER", 99.99, "2024-02-14"),
    ];
    for (region, channel, amount, ordered_at) in orders {
        conn.execute(
            "INSERT INTO ACME_MAIN_TABLE (REGION, CHANNEL, AMOUNT, ORDERED_AT) VALUES (?1, ?2, ?3, ?4)",
            params![region, channel, amount, ordered_at],
        )?;
    }

    let columns = [
        ("ORDER_ID", "INTEGER", "Unique order number"),
        ("REGION", "TEXT", "Sales region the order was booked in"),
        ("CHANNEL", "TEXT", ""),
        ("AMOUNT", "REAL", "Order value in USD"),
        ("ORDERED_AT", "TEXT", "ISO-8601 order date"),
    ];
    for (name, data_type, description) in columns {
        conn.execute(
            "INSERT INTO ACME_MAIN_TABLE_DESCRIPTION (COLUMN_NAME, DATA_TYPE, DESCRIPTION) VALUES (?1, ?2, ?3)",
            params![name, data_type, description],
        )?;
    }

    // No GRAPH_GENERATION_PROMPT row; it loads as an empty prompt
    conn.execute(
        "INSERT INTO ACME_PROMPT_TABLE (NAME, TEXT) VALUES ('SQL_GENERATION_PROMPT', ?1)",
        params!["You write SQLite queries against ACME_MAIN_TABLE."],
    )?;

    println!("Created demo system store at: {}", db_path.display());
    println!("   Point a sqlite profile's database at: {}", db_path.parent().map(|p| p.display().to_string()).unwrap_or_default());

    Ok(())
}
