pub mod amount;
mod category;
mod transaction;

pub use category::Category;
pub use transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType};
