use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{amount, Category, NewTransaction, TransactionPatch, TransactionType};
use crate::store::{predict_categories, Period, TransactionFilter};

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &[
    "--type",
    "--category",
    "--date",
    "--notes",
    "--amount",
    "--description",
    "--search",
    "--from",
    "--to",
    "--period",
];

pub(crate) fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

pub(crate) fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
pub(crate) fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

pub(crate) fn parse_category(s: &str) -> Result<Category> {
    match Category::parse(s) {
        Some(c) => Ok(c),
        None => bail!("Unknown category: {s} (see `fintrack categories`)"),
    }
}

pub(crate) fn parse_type(s: &str) -> Result<TransactionType> {
    match TransactionType::parse(s) {
        Some(t) => Ok(t),
        None => bail!("Unknown type: {s} (expected income or expense)"),
    }
}

pub(crate) fn parse_period(s: &str) -> Result<Period> {
    match Period::parse(s) {
        Some(p) => Ok(p),
        None => bail!("Unknown period: {s} (expected week, month, year or all)"),
    }
}

/// Accepts formatted input such as `1,200.50` or `$45`.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    if !s.chars().any(|c| c.is_ascii_digit()) {
        bail!("Invalid amount: {s}");
    }
    let value = amount::normalize(s);
    if value < Decimal::ZERO {
        bail!("Amount must not be negative: {s}");
    }
    Ok(value)
}

/// `<amount> <description...> [--type t] [--category c] [--date d] [--notes n]`
///
/// Without `--category` the best keyword prediction is used; without `--type`
/// the category's usual type is used.
pub(crate) fn parse_new_transaction(args: &[String], today: NaiveDate) -> Result<NewTransaction> {
    let words = positionals(args);
    let Some((raw_amount, rest)) = words.split_first() else {
        bail!("Usage: fintrack add <amount> <description> [--type income|expense] [--category <c>] [--date YYYY-MM-DD] [--notes <text>]");
    };
    let amount = parse_amount(raw_amount)?;

    let description = rest.join(" ");
    if description.trim().is_empty() {
        bail!("A description is required");
    }

    let category = match flag_value(args, "--category") {
        Some(c) => parse_category(c)?,
        None => predict_categories(&description)
            .first()
            .copied()
            .unwrap_or(Category::Other),
    };

    let kind = match flag_value(args, "--type") {
        Some(t) => parse_type(t)?,
        None => category.usual_type(),
    };

    let date = match flag_value(args, "--date") {
        Some(d) => parse_date(d)?,
        None => today,
    };

    Ok(NewTransaction {
        amount,
        description,
        category,
        date,
        kind,
        notes: flag_value(args, "--notes").map(str::to_string),
    })
}

pub(crate) fn parse_patch(args: &[String]) -> Result<TransactionPatch> {
    let mut patch = TransactionPatch::default();
    if let Some(a) = flag_value(args, "--amount") {
        patch.amount = Some(parse_amount(a)?);
    }
    if let Some(d) = flag_value(args, "--description") {
        patch.description = Some(d.to_string());
    }
    if let Some(c) = flag_value(args, "--category") {
        patch.category = Some(parse_category(c)?);
    }
    if let Some(d) = flag_value(args, "--date") {
        patch.date = Some(parse_date(d)?);
    }
    if let Some(t) = flag_value(args, "--type") {
        patch.kind = Some(parse_type(t)?);
    }
    if has_flag(args, "--clear-notes") {
        patch.notes = Some(None);
    } else if let Some(n) = flag_value(args, "--notes") {
        patch.notes = Some(Some(n.to_string()));
    }

    if patch.is_empty() {
        bail!("Nothing to change. Use --amount, --description, --category, --date, --type, --notes or --clear-notes");
    }
    Ok(patch)
}

pub(crate) fn parse_filter(args: &[String]) -> Result<TransactionFilter> {
    Ok(TransactionFilter {
        search: flag_value(args, "--search").map(str::to_string),
        kind: flag_value(args, "--type").map(parse_type).transpose()?,
        category: flag_value(args, "--category")
            .map(parse_category)
            .transpose()?,
        from: flag_value(args, "--from").map(parse_date).transpose()?,
        to: flag_value(args, "--to").map(parse_date).transpose()?,
    })
}
