//! Contains the read-only store interface for [transactions](crate::Transaction)
//! and its SQLite implementation.

mod transaction;

pub mod sqlite;

pub use transaction::{
    CategoryCount, PriceRange, TransactionFilter, TransactionQuery, TransactionStore,
};
