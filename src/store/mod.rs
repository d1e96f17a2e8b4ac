mod predict;
mod query;
mod seed;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::convert::Infallible;

use crate::models::{Category, NewTransaction, Transaction, TransactionPatch, TransactionType};

pub use predict::predict_categories;
pub use query::{Period, Summary, TransactionFilter};
pub(crate) use seed::seed_transactions;

/// The capability set handed to callers that record or query transactions.
///
/// Implementors provide the collection and the three mutations; every read
/// query is derived from `transactions()` and never reorders stored data.
/// `update` and `delete` report whether the collection changed; an unknown
/// id or an empty patch is a no-op.
pub trait TransactionRepository {
    type Error;

    /// Stored transactions, newest insertion first.
    fn transactions(&self) -> &[Transaction];

    fn add(&mut self, new: NewTransaction) -> Result<Transaction, Self::Error>;

    fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool, Self::Error>;

    fn delete(&mut self, id: &str) -> Result<bool, Self::Error>;

    fn get_by_id(&self, id: &str) -> Option<&Transaction> {
        self.transactions().iter().find(|t| t.id == id)
    }

    fn get_by_type(&self, kind: TransactionType) -> Vec<&Transaction> {
        self.transactions()
            .iter()
            .filter(|t| t.kind == kind)
            .collect()
    }

    fn get_by_category(&self, category: Category) -> Vec<&Transaction> {
        self.transactions()
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    fn get_recent(&self, n: usize) -> Vec<&Transaction> {
        query::most_recent(self.transactions(), n)
    }

    fn get_total_by_type(&self, kind: TransactionType) -> Decimal {
        query::sum_amounts(self.transactions().iter().filter(|t| t.kind == kind))
    }

    fn predict_categories(&self, description: &str) -> Vec<Category> {
        predict_categories(description)
    }

    fn filter(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        self.transactions()
            .iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    fn summary(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Summary {
        query::summarize(
            self.transactions()
                .iter()
                .filter(|t| query::in_range(t.date, from, to)),
        )
    }

    fn expenses_by_category(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<(Category, Decimal)> {
        query::expenses_by_category(
            self.transactions()
                .iter()
                .filter(|t| query::in_range(t.date, from, to)),
        )
    }
}

/// In-memory transaction collection with no I/O of its own.
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    last_id: i64,
}

impl TransactionStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            last_id: 0,
        }
    }

    pub fn seeded(today: NaiveDate) -> Self {
        Self::new(seed_transactions(today))
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Swap in a whole new collection, e.g. after an import.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    /// Millisecond timestamp, bumped past the last issued id and any id
    /// already present.
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let mut candidate = now.max(self.last_id + 1);
        let taken: HashSet<&str> = self.transactions.iter().map(|t| t.id.as_str()).collect();
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        self.last_id = candidate;
        candidate.to_string()
    }
}

impl TransactionRepository for TransactionStore {
    type Error = Infallible;

    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    fn add(&mut self, new: NewTransaction) -> Result<Transaction, Infallible> {
        let txn = Transaction::from_new(self.next_id(), new);
        self.transactions.insert(0, txn.clone());
        Ok(txn)
    }

    fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool, Infallible> {
        if patch.is_empty() {
            return Ok(false);
        }
        match self.transactions.iter_mut().find(|t| t.id == id) {
            Some(txn) => {
                txn.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: &str) -> Result<bool, Infallible> {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        Ok(self.transactions.len() != before)
    }
}
