//! The persisted JSON document.
//!
//! On disk and in exports the collection is wrapped in a versioned envelope:
//! `{"state":{"transactions":[...]},"version":0}`. Imports also accept the
//! bare `{"transactions":[...]}` form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::models::Transaction;

pub const STATE_VERSION: u32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("unexpected document shape: {0}")]
    InvalidShape(#[source] serde_json::Error),
    #[error("duplicate transaction id: {0}")]
    DuplicateId(String),
}

#[derive(Serialize)]
struct StateRef<'a> {
    transactions: &'a [Transaction],
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Deserialize)]
struct State {
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
struct Envelope {
    state: State,
}

/// Compact form, as written to storage.
pub fn render(transactions: &[Transaction]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&envelope(transactions))
}

/// Indented form, as written to export files.
pub fn render_pretty(transactions: &[Transaction]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&envelope(transactions))
}

fn envelope(transactions: &[Transaction]) -> EnvelopeRef<'_> {
    EnvelopeRef {
        state: StateRef { transactions },
        version: STATE_VERSION,
    }
}

/// Parse either document form. Nothing is returned unless every record is valid.
pub fn parse(text: &str) -> Result<Vec<Transaction>, DocumentError> {
    let value: Value = serde_json::from_str(text).map_err(DocumentError::InvalidJson)?;

    let transactions = if value.get("state").is_some() {
        serde_json::from_value::<Envelope>(value)
            .map_err(DocumentError::InvalidShape)?
            .state
            .transactions
    } else {
        serde_json::from_value::<State>(value)
            .map_err(DocumentError::InvalidShape)?
            .transactions
    };

    let mut seen = HashSet::new();
    for txn in &transactions {
        if !seen.insert(txn.id.as_str()) {
            return Err(DocumentError::DuplicateId(txn.id.clone()));
        }
    }

    Ok(transactions)
}
