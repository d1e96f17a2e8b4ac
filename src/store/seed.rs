use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Category, Transaction, TransactionType};

/// Sample data used on first run and whenever persisted state cannot be read.
pub(crate) fn seed_transactions(today: NaiveDate) -> Vec<Transaction> {
    let days_ago = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);

    let rows: [(&str, i64, &str, Category, NaiveDate, TransactionType); 6] = [
        ("1", 1200, "Salary", Category::Salary, today, TransactionType::Income),
        ("2", 45, "Groceries", Category::Food, today, TransactionType::Expense),
        ("3", 850, "Rent", Category::Housing, today, TransactionType::Expense),
        ("4", 120, "Dining out", Category::Food, days_ago(1), TransactionType::Expense),
        ("5", 80, "Electricity bill", Category::Utilities, days_ago(2), TransactionType::Expense),
        ("6", 200, "Freelance work", Category::Business, days_ago(3), TransactionType::Income),
    ];

    rows.into_iter()
        .map(|(id, amount, description, category, date, kind)| Transaction {
            id: id.to_string(),
            amount: Decimal::from(amount),
            description: description.to_string(),
            category,
            date,
            kind,
            notes: None,
        })
        .collect()
}
