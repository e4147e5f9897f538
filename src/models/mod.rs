pub mod currency;
mod transaction;

pub use transaction::{Transaction, TransactionKind, TransactionUpdate};

#[cfg(test)]
mod tests;
