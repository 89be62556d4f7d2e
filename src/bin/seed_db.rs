use std::{
    error::Error,
    fs::File,
    io::BufReader,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;

use sales_insights::{NewTransaction, initialize_db, stores::sqlite::SQLiteTransactionStore};

/// A utility for seeding the database of the sales_insights server with the
/// product transaction data set.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database to create or add to.
    #[arg(long, short)]
    db_path: String,

    /// File path to a JSON array of transactions, e.g. `product_transaction.json`.
    #[arg(long, short)]
    input: String,
}

/// Load the transactions in the input file into the database.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let input_path = Path::new(&args.input);

    if !input_path.is_file() {
        eprintln!("Could not find the input file {input_path:#?}.");
        exit(1);
    }

    println!("Reading transactions from {input_path:#?}");
    let reader = BufReader::new(File::open(input_path)?);
    let transactions: Vec<NewTransaction> = serde_json::from_reader(reader)?;

    println!("Opening database at {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;

    initialize_db(&conn)?;

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let imported_count = store.import(transactions)?;

    println!("Imported {imported_count} transactions.");

    Ok(())
}
