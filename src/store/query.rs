use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Category, Transaction, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
    All,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "week" | "w" => Some(Self::Week),
            "month" | "m" => Some(Self::Month),
            "year" | "y" => Some(Self::Year),
            "all" | "a" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// First day included in the period ending on `today`. `None` means unbounded.
    pub fn start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Week => today.checked_sub_days(Days::new(7)),
            Self::Month => today.checked_sub_months(Months::new(1)),
            Self::Year => today.checked_sub_months(Months::new(12)),
            Self::All => None,
        }
    }

    /// Inclusive `(from, to)` bounds for the period ending on `today`.
    pub fn range(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            Self::All => (None, None),
            _ => (self.start(today), Some(today)),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Criteria for narrowing the transaction list. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            if !txn
                .description
                .to_lowercase()
                .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        if self.kind.is_some_and(|k| txn.kind != k) {
            return false;
        }
        if self.category.is_some_and(|c| txn.category != c) {
            return false;
        }
        in_range(txn.date, self.from, self.to)
    }
}

pub(crate) fn in_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    /// Whole percent of income kept; zero when there is no income.
    pub savings_rate: Decimal,
    pub count: usize,
}

/// Totals saturate at `Decimal::MAX` instead of overflowing.
pub(crate) fn sum_amounts<'a>(txns: impl Iterator<Item = &'a Transaction>) -> Decimal {
    txns.fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

pub(crate) fn summarize<'a>(txns: impl Iterator<Item = &'a Transaction>) -> Summary {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut count = 0;
    for txn in txns {
        match txn.kind {
            TransactionType::Income => income = income.saturating_add(txn.amount),
            TransactionType::Expense => expenses = expenses.saturating_add(txn.amount),
        }
        count += 1;
    }
    let balance = income.saturating_sub(expenses);
    let savings_rate = if income > Decimal::ZERO {
        balance
            .checked_div(income)
            .map(|r| r.saturating_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    Summary {
        income,
        expenses,
        balance,
        savings_rate,
        count,
    }
}

/// Expense totals per category, largest first. Empty categories are left out.
pub(crate) fn expenses_by_category<'a>(
    txns: impl Iterator<Item = &'a Transaction>,
) -> Vec<(Category, Decimal)> {
    let mut totals = [Decimal::ZERO; Category::COUNT];
    for txn in txns.filter(|t| t.is_expense()) {
        let slot = &mut totals[txn.category as usize];
        *slot = slot.saturating_add(txn.amount);
    }

    let mut out: Vec<(Category, Decimal)> = Category::all()
        .iter()
        .map(|c| (*c, totals[*c as usize]))
        .filter(|(_, total)| !total.is_zero())
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// The `n` most recent transactions by date. Same-date records keep their
/// relative order from `txns`.
pub(crate) fn most_recent(txns: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = txns.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}
