#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::ExtractorSection;
use crate::store::TransactionStore;
use rust_decimal_macros::dec;
use std::cell::Cell;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

fn understood(text: &str) -> NewTransaction {
    match parse_reply(text, today()).unwrap() {
        Extraction::Understood(new) => new,
        Extraction::NotUnderstood => unreachable!("expected a transaction from {text}"),
    }
}

/// Returns a canned result and counts calls.
struct FakeExtractor {
    reply: fn() -> Result<Extraction, ExtractError>,
    calls: Cell<usize>,
}

impl FakeExtractor {
    fn new(reply: fn() -> Result<Extraction, ExtractError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }
}

impl TransactionExtractor for FakeExtractor {
    fn extract(&self, _text: &str, _today: NaiveDate) -> Result<Extraction, ExtractError> {
        self.calls.set(self.calls.get() + 1);
        (self.reply)()
    }
}

// ── Reply parsing ─────────────────────────────────────────────

#[test]
fn test_clean_json_reply_strips_fences() {
    let raw = "```json\n{\"amount\": 5}\n```\n";
    assert_eq!(clean_json_reply(raw), "{\"amount\": 5}");
    assert_eq!(clean_json_reply("  {}  "), "{}");
}

#[test]
fn test_parse_full_reply() {
    let new = understood(
        r#"{"type":"expense","amount":150000,"description":"Groceries at the supermarket","category":"food","date":"2024-03-18"}"#,
    );
    assert_eq!(new.kind, TransactionType::Expense);
    assert_eq!(new.amount, dec!(150000));
    assert_eq!(new.description, "Groceries at the supermarket");
    assert_eq!(new.category, Category::Food);
    assert_eq!(new.date, NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
    assert_eq!(new.notes, None);
}

#[test]
fn test_parse_fenced_reply() {
    let new = understood("```json\n{\"type\":\"income\",\"amount\":5000000,\"description\":\"Salary\",\"category\":\"salary\",\"date\":\"2024-03-01\"}\n```");
    assert_eq!(new.kind, TransactionType::Income);
    assert_eq!(new.category, Category::Salary);
}

#[test]
fn test_parse_fills_defaults() {
    let new = understood(r#"{"amount":"Rp 25.000","description":"taxi to office","category":"rides","date":"yesterday"}"#);
    assert_eq!(new.amount, dec!(25.000));
    assert_eq!(new.category, Category::Other);
    assert_eq!(new.kind, TransactionType::Expense);
    assert_eq!(new.date, today());
}

#[test]
fn test_parse_missing_category_uses_keywords() {
    let new = understood(r#"{"amount":12,"description":"Netflix subscription","type":"expense"}"#);
    assert_eq!(new.category, Category::Entertainment);
}

#[test]
fn test_parse_negative_amount_made_positive() {
    let new = understood(r#"{"amount":-40.5,"description":"Pharmacy","category":"healthcare"}"#);
    assert_eq!(new.amount, dec!(40.5));
}

#[test]
fn test_parse_array_reply_takes_first() {
    let new = understood(r#"[{"amount":3,"description":"Coffee","category":"food"}]"#);
    assert_eq!(new.description, "Coffee");
}

#[test]
fn test_parse_not_understood() {
    for reply in ["", "null", "```json\nnull\n```", "{}", "[]", r#"{"amount":0,"description":"x"}"#, r#"{"amount":10}"#, r#"{"amount":10,"description":"  "}"#] {
        assert_eq!(parse_reply(reply, today()).unwrap(), Extraction::NotUnderstood, "{reply}");
    }
}

#[test]
fn test_parse_invalid_reply() {
    assert!(matches!(
        parse_reply("Sorry, I can't help with that.", today()),
        Err(ExtractError::InvalidResponse(_))
    ));
    assert!(matches!(
        parse_reply("42", today()),
        Err(ExtractError::InvalidResponse(_))
    ));
}

#[test]
fn test_build_prompt_mentions_categories_and_date() {
    let prompt = build_prompt("coffee 3", today());
    assert!(prompt.contains("\"coffee 3\""));
    assert!(prompt.contains("housing, transportation, food"));
    assert!(prompt.contains("gift"));
    assert!(prompt.contains("2024-03-20"));
}

// ── Ask workflow ──────────────────────────────────────────────

#[test]
fn test_ask_records_understood_transaction() {
    let mut store = TransactionStore::default();
    let extractor = FakeExtractor::new(|| {
        Ok(Extraction::Understood(NewTransaction {
            amount: dec!(50000),
            description: "Dinner".into(),
            category: Category::Food,
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            kind: TransactionType::Expense,
            notes: None,
        }))
    });

    let outcome = ask(&mut store, &extractor, "dinner 50k", today()).unwrap();
    match outcome {
        AskOutcome::Recorded(txn) => {
            assert_eq!(txn.description, "Dinner");
            assert_eq!(store.get_by_id(&txn.id).unwrap().amount, dec!(50000));
        }
        other => unreachable!("unexpected outcome {other:?}"),
    }
    assert_eq!(store.len(), 1);
}

#[test]
fn test_ask_not_understood_leaves_store() {
    let mut store = TransactionStore::seeded(today());
    let extractor = FakeExtractor::new(|| Ok(Extraction::NotUnderstood));
    let outcome = ask(&mut store, &extractor, "hello there", today()).unwrap();
    assert!(matches!(outcome, AskOutcome::NotUnderstood));
    assert_eq!(store.len(), 6);
}

#[test]
fn test_ask_failure_is_distinct_and_leaves_store() {
    let mut store = TransactionStore::seeded(today());
    let extractor = FakeExtractor::new(|| Err(ExtractError::InvalidResponse("garbage".into())));
    let outcome = ask(&mut store, &extractor, "coffee 3", today()).unwrap();
    assert!(matches!(outcome, AskOutcome::Failed(ExtractError::InvalidResponse(_))));
    assert_eq!(store.len(), 6);
}

#[test]
fn test_ask_blank_input_skips_extractor() {
    let mut store = TransactionStore::default();
    let extractor = FakeExtractor::new(|| Ok(Extraction::NotUnderstood));
    let outcome = ask(&mut store, &extractor, "   ", today()).unwrap();
    assert!(matches!(outcome, AskOutcome::NotUnderstood));
    assert_eq!(extractor.calls.get(), 0);
}

// ── Gemini client ─────────────────────────────────────────────

#[test]
fn test_gemini_without_key() {
    let config = ExtractorSection {
        api_key: None,
        ..Default::default()
    };
    let extractor = GeminiExtractor::new(&config).unwrap();
    assert!(matches!(
        extractor.extract("coffee 3", today()),
        Err(ExtractError::MissingApiKey)
    ));
}

#[test]
fn test_gemini_blank_key_counts_as_missing() {
    let config = ExtractorSection {
        api_key: Some("   ".into()),
        ..Default::default()
    };
    let extractor = GeminiExtractor::new(&config).unwrap();
    assert!(matches!(
        extractor.extract("coffee 3", today()),
        Err(ExtractError::MissingApiKey)
    ));
}

#[test]
fn test_gemini_unreachable_host_is_http_error() {
    let config = ExtractorSection {
        api_key: Some("test-key".into()),
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 2,
        ..Default::default()
    };
    let extractor = GeminiExtractor::new(&config).unwrap();
    assert!(matches!(
        extractor.extract("coffee 3", today()),
        Err(ExtractError::Http(_))
    ));
}

#[test]
fn test_gemini_endpoint() {
    let config = ExtractorSection {
        base_url: "https://example.test/".into(),
        model: "gemini-test".into(),
        ..Default::default()
    };
    let extractor = GeminiExtractor::new(&config).unwrap();
    assert_eq!(
        extractor.endpoint(),
        "https://example.test/v1beta/models/gemini-test:generateContent"
    );
}
