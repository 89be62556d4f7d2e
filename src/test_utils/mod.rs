#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::{OffsetDateTime, macros::datetime};

use crate::{
    Error, NewTransaction, Transaction,
    db::initialize,
    stores::{
        CategoryCount, TransactionFilter, TransactionQuery, TransactionStore,
        sqlite::SQLiteTransactionStore,
    },
};

pub(crate) fn new_transaction(
    title: &str,
    price: f64,
    category: &str,
    sold: bool,
    date_of_sale: OffsetDateTime,
) -> NewTransaction {
    NewTransaction {
        title: title.to_owned(),
        description: String::new(),
        price,
        category: category.to_owned(),
        image: String::new(),
        sold,
        date_of_sale,
    }
}

/// Create an in-memory store holding `transactions`.
#[track_caller]
pub(crate) fn get_test_store(transactions: Vec<NewTransaction>) -> SQLiteTransactionStore {
    let conn = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&conn).expect("Could not initialize database.");

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    store
        .import(transactions)
        .expect("Could not import test transactions.");

    store
}

/// A small data set spread over several years, months, price ranges and
/// categories.
///
/// | #  | price   | category         | sold  | date of sale     |
/// |----|---------|------------------|-------|------------------|
/// | 1  | 329.85  | men's clothing   | false | 2021-11-27       |
/// | 2  | 44.6    | men's clothing   | false | 2021-10-27       |
/// | 3  | 615.89  | men's clothing   | true  | 2022-07-27       |
/// | 4  | 15.99   | men's clothing   | true  | 2021-10-27       |
/// | 5  | 6950.0  | jewelery         | true  | 2022-06-27       |
/// | 6  | 168.0   | jewelery         | false | 2022-03-27       |
/// | 7  | 9.99    | jewelery         | true  | 2022-03-27       |
/// | 8  | 64.0    | electronics      | false | 2022-03-27       |
/// | 9  | 109.0   | electronics      | true  | 2022-03-27       |
/// | 10 | 999.99  | electronics      | true  | 2023-03-27       |
/// | 11 | 599.0   | electronics      | false | 2021-03-27       |
/// | 12 | 300.0   | women's clothing | true  | 2023-06-15       |
/// | 13 | 9.85    | women's clothing | false | 2023-06-30 23:00 |
/// | 14 | 7.95    | women's clothing | true  | 2023-12-05       |
/// | 15 | 12.99   | women's clothing | false | 2022-12-10       |
pub(crate) fn sample_transactions() -> Vec<NewTransaction> {
    let mut hard_drive = new_transaction(
        "WD 2TB Elements Portable External Hard Drive",
        64.0,
        "electronics",
        false,
        datetime!(2022-03-27 10:00 UTC),
    );
    hard_drive.description = "USB 3.0 with transfer rates up to 300MB/s".to_owned();

    vec![
        new_transaction(
            "Fjallraven Backpack",
            329.85,
            "men's clothing",
            false,
            datetime!(2021-11-27 14:59:54 UTC),
        ),
        new_transaction(
            "Mens Casual Premium Slim Fit T-Shirts",
            44.6,
            "men's clothing",
            false,
            datetime!(2021-10-27 14:59:54 UTC),
        ),
        new_transaction(
            "Mens Cotton Jacket",
            615.89,
            "men's clothing",
            true,
            datetime!(2022-07-27 14:59:54 UTC),
        ),
        new_transaction(
            "Mens Casual Slim Fit",
            15.99,
            "men's clothing",
            true,
            datetime!(2021-10-27 14:59:54 UTC),
        ),
        new_transaction(
            "John Hardy Women's Legends Naga Gold & Silver Dragon Station Chain Bracelet",
            6950.0,
            "jewelery",
            true,
            datetime!(2022-06-27 14:59:54 UTC),
        ),
        new_transaction(
            "Solid Gold Petite Micropave",
            168.0,
            "jewelery",
            false,
            datetime!(2022-03-27 14:59:54 UTC),
        ),
        new_transaction(
            "White Gold Plated Princess",
            9.99,
            "jewelery",
            true,
            datetime!(2022-03-27 14:59:54 UTC),
        ),
        hard_drive,
        new_transaction(
            "SanDisk SSD PLUS 1TB Internal SSD",
            109.0,
            "electronics",
            true,
            datetime!(2022-03-27 14:59:54 UTC),
        ),
        new_transaction(
            "Samsung 49-Inch CHG90 Gaming Monitor",
            999.99,
            "electronics",
            true,
            datetime!(2023-03-27 14:59:54 UTC),
        ),
        new_transaction(
            "Acer SB220Q 21.5 inch Monitor",
            599.0,
            "electronics",
            false,
            datetime!(2021-03-27 14:59:54 UTC),
        ),
        new_transaction(
            "Rain Jacket Women Windbreaker",
            300.0,
            "women's clothing",
            true,
            datetime!(2023-06-15 14:59:54 UTC),
        ),
        new_transaction(
            "MBJ Women's Solid Short Sleeve Boat Neck",
            9.85,
            "women's clothing",
            false,
            datetime!(2023-06-30 23:00 UTC),
        ),
        new_transaction(
            "Opna Women's Short Sleeve Moisture",
            7.95,
            "women's clothing",
            true,
            datetime!(2023-12-05 14:59:54 UTC),
        ),
        new_transaction(
            "DANVOUY Womens T Shirt Casual Cotton Short",
            12.99,
            "women's clothing",
            false,
            datetime!(2022-12-10 14:59:54 UTC),
        ),
    ]
}

/// A store operation that [FailingStore] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreOperation {
    Find,
    Count,
    SumPrice,
    CountByCategory,
}

/// Wraps a working store but fails one kind of operation.
#[derive(Debug, Clone)]
pub(crate) struct FailingStore {
    pub(crate) inner: SQLiteTransactionStore,
    pub(crate) fail_on: StoreOperation,
}

impl FailingStore {
    pub(crate) fn new(fail_on: StoreOperation) -> Self {
        Self {
            inner: get_test_store(sample_transactions()),
            fail_on,
        }
    }

    fn check(&self, operation: StoreOperation) -> Result<(), Error> {
        if operation == self.fail_on {
            Err(Error::StoreUnavailable(format!("{operation:?} failed")))
        } else {
            Ok(())
        }
    }
}

impl TransactionStore for FailingStore {
    fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        self.check(StoreOperation::Find)?;
        self.inner.find(query)
    }

    fn count(&self, filter: &TransactionFilter) -> Result<usize, Error> {
        self.check(StoreOperation::Count)?;
        self.inner.count(filter)
    }

    fn sum_price(&self, filter: &TransactionFilter) -> Result<f64, Error> {
        self.check(StoreOperation::SumPrice)?;
        self.inner.sum_price(filter)
    }

    fn count_by_category(&self, filter: &TransactionFilter) -> Result<Vec<CategoryCount>, Error> {
        self.check(StoreOperation::CountByCategory)?;
        self.inner.count_by_category(filter)
    }
}
