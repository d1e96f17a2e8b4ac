//! Turning free text ("lunch with the team 85000") into a transaction.
//!
//! The heavy lifting is delegated to a hosted generative model; this module
//! owns the prompt, the reply parsing and the record-it workflow.

mod gemini;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::models::{amount, Category, NewTransaction, Transaction, TransactionType};
use crate::store::{predict_categories, TransactionRepository};

pub use gemini::GeminiExtractor;

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Understood(NewTransaction),
    /// The service answered but found no transaction in the text.
    NotUnderstood,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no API key configured (set GEMINI_API_KEY or [extractor] api_key)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unreadable reply: {0}")]
    InvalidResponse(String),
}

pub trait TransactionExtractor {
    fn extract(&self, text: &str, today: NaiveDate) -> Result<Extraction, ExtractError>;
}

#[derive(Debug)]
pub enum AskOutcome {
    Recorded(Transaction),
    NotUnderstood,
    Failed(ExtractError),
}

/// Extract a transaction from `text` and record it.
///
/// Extractor failures come back as `AskOutcome::Failed` and leave the
/// repository untouched; only repository errors are returned as `Err`.
pub fn ask<R: TransactionRepository>(
    repo: &mut R,
    extractor: &dyn TransactionExtractor,
    text: &str,
    today: NaiveDate,
) -> Result<AskOutcome, R::Error> {
    if text.trim().is_empty() {
        return Ok(AskOutcome::NotUnderstood);
    }
    match extractor.extract(text, today) {
        Ok(Extraction::Understood(new)) => Ok(AskOutcome::Recorded(repo.add(new)?)),
        Ok(Extraction::NotUnderstood) => Ok(AskOutcome::NotUnderstood),
        Err(e) => Ok(AskOutcome::Failed(e)),
    }
}

pub(crate) fn build_prompt(text: &str, today: NaiveDate) -> String {
    let categories = Category::all()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Analyze the following financial transaction and extract its details as JSON:\n\
         \"{text}\"\n\n\
         Reply with a single JSON object of this shape:\n\
         {{\n\
         \x20 \"type\": \"income\" or \"expense\",\n\
         \x20 \"amount\": number (no currency symbol or thousands separator),\n\
         \x20 \"description\": \"short description\",\n\
         \x20 \"category\": one of: {categories},\n\
         \x20 \"date\": \"YYYY-MM-DD\" (use {today} if not mentioned)\n\
         }}\n\n\
         Example input: \"Bought groceries at the supermarket for 150000\"\n\
         Example output: {{\"type\": \"expense\", \"amount\": 150000, \"description\": \"Groceries at the supermarket\", \"category\": \"food\", \"date\": \"{today}\"}}\n\n\
         If the text does not describe a transaction, reply with null.\n\
         Reply with the JSON only, no commentary.",
        today = today.format("%Y-%m-%d"),
    )
}

/// Remove Markdown code fences the model likes to wrap JSON in.
pub(crate) fn clean_json_reply(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret the model's reply text.
pub(crate) fn parse_reply(text: &str, today: NaiveDate) -> Result<Extraction, ExtractError> {
    let cleaned = clean_json_reply(text);
    if cleaned.is_empty() {
        return Ok(Extraction::NotUnderstood);
    }

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ExtractError::InvalidResponse(format!("{e}: {cleaned}")))?;

    let object = match value {
        Value::Null => return Ok(Extraction::NotUnderstood),
        Value::Object(map) => map,
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => return Ok(Extraction::NotUnderstood),
            Some(other) => {
                return Err(ExtractError::InvalidResponse(format!(
                    "expected an object, got {other}"
                )))
            }
        },
        other => {
            return Err(ExtractError::InvalidResponse(format!(
                "expected an object, got {other}"
            )))
        }
    };

    Ok(from_object(&object, today))
}

fn from_object(object: &Map<String, Value>, today: NaiveDate) -> Extraction {
    let amount = match object.get("amount").and_then(value_to_decimal) {
        Some(a) if !a.is_zero() => a.abs(),
        _ => return Extraction::NotUnderstood,
    };

    let description = match object.get("description").and_then(Value::as_str) {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => return Extraction::NotUnderstood,
    };

    let category = match object.get("category").and_then(Value::as_str) {
        Some(c) => Category::parse_or_other(c),
        None => predict_categories(&description)
            .first()
            .copied()
            .unwrap_or(Category::Other),
    };

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(TransactionType::parse)
        .unwrap_or(TransactionType::Expense);

    let date = object
        .get("date")
        .and_then(Value::as_str)
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or(today);

    Extraction::Understood(NewTransaction {
        amount,
        description,
        category,
        date,
        kind,
        notes: None,
    })
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::from_str(&f.to_string()).ok())
            }
        }
        Value::String(s) => Some(amount::normalize(s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
