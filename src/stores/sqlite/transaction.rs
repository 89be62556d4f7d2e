//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{Type, Value},
};

use crate::{
    Error, NewTransaction, Transaction,
    stores::{
        TransactionStore,
        transaction::{CategoryCount, TransactionFilter, TransactionQuery},
    },
    transaction::{TRANSACTION_COLUMNS, map_transaction_row, to_unix_millis},
};

/// Stores transactions in a SQLite database.
///
/// The transaction table must exist, see [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Insert many transactions, e.g. from the seed data set.
    ///
    /// All transactions are inserted in a single SQL transaction, so either
    /// all of them are stored or none are.
    ///
    /// # Errors
    /// Returns an [Error::StoreUnavailable] if there is an SQL error, e.g.
    /// a negative price.
    pub fn import(&self, transactions: Vec<NewTransaction>) -> Result<usize, Error> {
        let connection = self.lock()?;

        let tx = connection.unchecked_transaction()?;

        // Prepare the insert statement once for reuse
        let mut stmt = tx.prepare(
            "INSERT INTO \"transaction\" (title, description, price, category, image, sold, date_of_sale, title_folded, description_folded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        let mut imported_count = 0;

        for transaction in transactions {
            let title_folded = transaction.title.to_lowercase();
            let description_folded = transaction.description.to_lowercase();

            imported_count += stmt.execute((
                transaction.title,
                transaction.description,
                transaction.price,
                transaction.category,
                transaction.image,
                transaction.sold,
                to_unix_millis(transaction.date_of_sale),
                title_folded,
                description_folded,
            ))?;
        }

        drop(stmt);

        tx.commit()?;
        Ok(imported_count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::StoreUnavailable("could not acquire the database lock".to_owned())
        })
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Query for a page of transactions in the database, ordered by ID.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is a SQL error.
    fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let (where_clause, mut query_parameters) = build_where_clause(&query.filter);

        // A negative limit means no limit in SQLite.
        let limit = query.limit.map_or(-1, to_sql_integer);
        query_parameters.push(Value::Integer(limit));
        query_parameters.push(Value::Integer(to_sql_integer(query.offset)));

        let query_string = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"{where_clause} \
            ORDER BY id ASC LIMIT ?{} OFFSET ?{}",
            query_parameters.len() - 1,
            query_parameters.len(),
        );

        self.lock()?
            .prepare(&query_string)?
            .query_map(params_from_iter(query_parameters.iter()), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Count the matching transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is a SQL error.
    fn count(&self, filter: &TransactionFilter) -> Result<usize, Error> {
        let (where_clause, query_parameters) = build_where_clause(filter);

        self.lock()?
            .query_row(
                &format!("SELECT COUNT(id) FROM \"transaction\"{where_clause}"),
                params_from_iter(query_parameters.iter()),
                |row| read_count(row, 0),
            )
            .map_err(Error::from)
    }

    /// Sum the prices of the matching transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is a SQL error.
    fn sum_price(&self, filter: &TransactionFilter) -> Result<f64, Error> {
        let (where_clause, query_parameters) = build_where_clause(filter);

        self.lock()?
            .query_row(
                &format!("SELECT COALESCE(SUM(price), 0.0) FROM \"transaction\"{where_clause}"),
                params_from_iter(query_parameters.iter()),
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    /// Count the matching transactions per category, ordered by category.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is a SQL error.
    fn count_by_category(&self, filter: &TransactionFilter) -> Result<Vec<CategoryCount>, Error> {
        let (where_clause, query_parameters) = build_where_clause(filter);

        self.lock()?
            .prepare(&format!(
                "SELECT category, COUNT(id) FROM \"transaction\"{where_clause} \
                GROUP BY category ORDER BY category ASC"
            ))?
            .query_map(params_from_iter(query_parameters.iter()), |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: read_count(row, 1)?,
                })
            })?
            .map(|maybe_count| maybe_count.map_err(Error::from))
            .collect()
    }
}

/// Build the `WHERE` clause (with a leading space) and its positional
/// parameters for `filter`.
///
/// Returns an empty clause if the filter matches every transaction.
fn build_where_clause(filter: &TransactionFilter) -> (String, Vec<Value>) {
    let mut where_clause_parts = vec![];
    let mut query_parameters = vec![];

    if let Some(search) = filter.search.as_ref().filter(|search| !search.matches_all()) {
        query_parameters.push(Value::Text(search.like_pattern()));
        let pattern = query_parameters.len();

        let mut conditions = vec![
            format!("title_folded LIKE ?{pattern} ESCAPE '\\'"),
            format!("description_folded LIKE ?{pattern} ESCAPE '\\'"),
        ];

        if let Some(price) = search.price() {
            query_parameters.push(Value::Real(price));
            conditions.push(format!("price = ?{}", query_parameters.len()));
        }

        where_clause_parts.push(format!("({})", conditions.join(" OR ")));
    }

    if let Some(window) = filter.date_of_sale {
        where_clause_parts.push(format!(
            "date_of_sale >= ?{} AND date_of_sale < ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Integer(to_unix_millis(window.start)));
        query_parameters.push(Value::Integer(to_unix_millis(window.end)));
    }

    if let Some(sold) = filter.sold {
        query_parameters.push(Value::Integer(i64::from(sold)));
        where_clause_parts.push(format!("sold = ?{}", query_parameters.len()));
    }

    if let Some(range) = filter.price {
        query_parameters.push(Value::Real(range.min));
        where_clause_parts.push(format!("price >= ?{}", query_parameters.len()));

        if let Some(max) = range.max {
            query_parameters.push(Value::Real(max));
            where_clause_parts.push(format!("price < ?{}", query_parameters.len()));
        }
    }

    if where_clause_parts.is_empty() {
        (String::new(), query_parameters)
    } else {
        (
            format!(" WHERE {}", where_clause_parts.join(" AND ")),
            query_parameters,
        )
    }
}

/// Read the `COUNT` in column `index` of `row`.
///
/// SQLite returns counts as signed integers, a value that does not fit a
/// `usize` is reported as a conversion failure.
fn read_count(row: &Row, index: usize) -> Result<usize, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    usize::try_from(count).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
