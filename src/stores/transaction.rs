//! Defines the transaction store trait.

use serde::Serialize;

use crate::{Error, Transaction, month::MonthWindow, search::SearchPredicate};

/// Reads transactions and aggregates over them.
///
/// Stores are read-only from the point of view of the analytics: the data
/// set is treated as an immutable snapshot for the duration of a request.
/// Implementations are shared between concurrent requests and are called
/// from tokio's blocking thread pool.
pub trait TransactionStore {
    /// Retrieve a page of transactions matching `query`, in storage order.
    fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions matching `filter`.
    fn count(&self, filter: &TransactionFilter) -> Result<usize, Error>;

    /// Sum the prices of the transactions matching `filter`.
    ///
    /// Returns zero when nothing matches.
    fn sum_price(&self, filter: &TransactionFilter) -> Result<f64, Error>;

    /// Count the transactions matching `filter` per category.
    ///
    /// Only categories with at least one match are returned.
    fn count_by_category(&self, filter: &TransactionFilter) -> Result<Vec<CategoryCount>, Error>;
}

/// A price range `[min, max)`, open-ended when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    /// The lowest price in the range.
    pub min: f64,
    /// The first price after the range.
    pub max: Option<f64>,
}

/// Conditions a transaction must meet, combined with AND.
///
/// The default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Matches titles, descriptions and (for numeric searches) prices.
    pub search: Option<SearchPredicate>,
    /// Only include transactions sold within this window.
    pub date_of_sale: Option<MonthWindow>,
    /// Only include transactions with this sold flag.
    pub sold: Option<bool>,
    /// Only include transactions priced within this range.
    pub price: Option<PriceRange>,
}

impl TransactionFilter {
    /// Set the search predicate.
    pub fn search(mut self, search: SearchPredicate) -> Self {
        self.search = Some(search);
        self
    }

    /// Set the sale date window, or clear it with `None`.
    pub fn date_of_sale(mut self, window: Option<MonthWindow>) -> Self {
        self.date_of_sale = window;
        self
    }

    /// Set the sold flag to match exactly.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = Some(sold);
        self
    }

    /// Set the price range.
    pub fn price(mut self, range: PriceRange) -> Self {
        self.price = Some(range);
        self
    }
}

/// Defines how transactions should be fetched from [TransactionStore::find].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Which transactions to include.
    pub filter: TransactionFilter,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first N matching transactions.
    pub offset: u64,
}

/// The number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category label.
    #[serde(rename = "_id")]
    pub category: String,
    /// How many transactions have this category.
    pub count: usize,
}
