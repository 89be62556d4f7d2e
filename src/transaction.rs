//! Defines the sale transaction model and its database table.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// A product listing and whether it sold.
///
/// Transactions are read-only once seeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// The product title.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The listed price, never negative.
    pub price: f64,
    /// A short label such as "electronics".
    pub category: String,
    /// A URL to an image of the product.
    pub image: String,
    /// Whether the product sold.
    pub sold: bool,
    /// When the product was sold (or listed, for unsold products).
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
}

/// A transaction as it appears in the seed data, before the store assigns an ID.
///
/// Deserializes from the JSON layout of the product transaction data set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The product title.
    pub title: String,
    /// A text description of the product.
    #[serde(default)]
    pub description: String,
    /// The listed price.
    pub price: f64,
    /// A short label such as "electronics".
    pub category: String,
    /// A URL to an image of the product.
    #[serde(default)]
    pub image: String,
    /// Whether the product sold. Missing values count as unsold.
    #[serde(default)]
    pub sold: bool,
    /// When the product was sold.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                image TEXT NOT NULL,
                sold INTEGER NOT NULL DEFAULT 0,
                date_of_sale INTEGER NOT NULL,
                title_folded TEXT NOT NULL,
                description_folded TEXT NOT NULL
                )",
        (),
    )?;

    // Every query filters on the sale date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_of_sale ON \"transaction\"(date_of_sale);",
        (),
    )?;

    Ok(())
}

/// The columns read by [map_transaction_row], in order.
pub const TRANSACTION_COLUMNS: &str =
    "id, title, description, price, category, image, sold, date_of_sale";

/// Map a database row to a Transaction.
///
/// The row must hold the columns in [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let date_of_sale = row.get::<_, i64>(7)?;
    let date_of_sale = from_unix_millis(date_of_sale).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale,
    })
}

/// Convert a timestamp into the milliseconds since the Unix epoch stored in
/// the `date_of_sale` column.
pub fn to_unix_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{NewTransaction, from_unix_millis, to_unix_millis};

    #[test]
    fn unix_millis_keep_millisecond_precision() {
        let timestamp = datetime!(2022-03-27 14:59:54.123 +05:30);

        let millis = to_unix_millis(timestamp);

        assert_eq!(from_unix_millis(millis).unwrap(), timestamp);
    }

    #[test]
    fn deserializes_seed_record() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://example.com/backpack.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let got: NewTransaction = serde_json::from_str(json).unwrap();

        assert_eq!(got.title, "Fjallraven Backpack");
        assert_eq!(got.price, 329.85);
        assert!(!got.sold);
        assert_eq!(got.date_of_sale, datetime!(2021-11-27 20:29:54 +05:30));
    }

    #[test]
    fn missing_sold_flag_counts_as_unsold() {
        let json = r#"{
            "title": "Mug",
            "price": 10,
            "category": "home",
            "dateOfSale": "2022-01-01T00:00:00Z"
        }"#;

        let got: NewTransaction = serde_json::from_str(json).unwrap();

        assert!(!got.sold);
        assert_eq!(got.description, "");
    }
}
