use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use super::args::{
    flag_value, parse_filter, parse_new_transaction, parse_patch, parse_period,
    positionals,
};
use crate::config::{self, Config};
use crate::extract::{self, AskOutcome, GeminiExtractor};
use crate::format::{bar, format_amount, truncate};
use crate::ledger::Ledger;
use crate::models::{Category, Transaction, TransactionType};
use crate::storage::BlobStorage;
use crate::store::{Period, TransactionRepository};

/// Everything a command needs besides the ledger.
pub(crate) struct CliEnv<'a> {
    pub(crate) config: &'a Config,
    pub(crate) data_dir: &'a Path,
    pub(crate) today: NaiveDate,
}

pub(crate) fn as_cli<S: BlobStorage>(
    args: &[String],
    ledger: &mut Ledger<S>,
    env: &CliEnv,
) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_dashboard(ledger, env);
    };
    let rest = &args[2..];

    match command.as_str() {
        "add" | "a" => cli_add(rest, ledger, env),
        "list" | "ls" => cli_list(rest, ledger, env),
        "show" => cli_show(rest, ledger, env),
        "edit" => cli_edit(rest, ledger),
        "delete" | "rm" => cli_delete(rest, ledger),
        "recent" | "r" => cli_recent(rest, ledger, env),
        "summary" | "s" => cli_summary(rest, ledger, env),
        "predict" => cli_predict(rest, ledger),
        "ask" => cli_ask(rest, ledger, env),
        "export" => cli_export(rest, ledger, env),
        "import" => cli_import(rest, ledger),
        "categories" => cli_categories(),
        "init" => cli_init(env),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack - local-only personal finance tracker");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Show totals and recent transactions");
    println!("  add <amount> <description>    Record a transaction");
    println!("    --type <income|expense>     Default: the category's usual type");
    println!("    --category <name>           Default: predicted from the description");
    println!("    --date <YYYY-MM-DD>         Default: today");
    println!("    --notes <text>");
    println!("  ask <text>                    Describe a transaction in plain words");
    println!("  list                          List transactions");
    println!("    --search <text> --type <t> --category <c> --from <date> --to <date>");
    println!("  show <id>                     Show one transaction");
    println!("  edit <id> [--amount ..] [--description ..] [--category ..] [--date ..]");
    println!("            [--type ..] [--notes ..] [--clear-notes]");
    println!("  delete <id>                   Delete a transaction");
    println!("  recent [n]                    Most recent transactions by date");
    println!("  summary [--period <p>]        Totals and expenses by category");
    println!("                                (week, month, year, all; default: all)");
    println!("  predict <description>         Suggest categories for a description");
    println!("  export [path]                 Export all transactions as JSON");
    println!("  import <path>                 Replace all transactions from a JSON export");
    println!("  categories                    List categories");
    println!("  init                          Write a default config.toml");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

// ── Printing ─────────────────────────────────────────────────

fn print_transactions(txns: &[&Transaction], symbol: &str) {
    if txns.is_empty() {
        println!("No transactions");
        return;
    }
    println!(
        "{:<14} {:<10} {:<7} {:<14} {:>14}  Description",
        "ID", "Date", "Type", "Category", "Amount"
    );
    println!("{}", "─".repeat(90));
    for t in txns {
        let signed = match t.kind {
            TransactionType::Income => t.amount,
            TransactionType::Expense => -t.amount,
        };
        println!(
            "{:<14} {:<10} {:<7} {:<14} {:>14}  {}",
            truncate(&t.id, 14),
            t.date.format("%Y-%m-%d"),
            t.kind,
            t.category,
            format_amount(signed, symbol),
            truncate(&t.description, 40),
        );
    }
}

fn print_transaction(t: &Transaction, symbol: &str) {
    println!("ID:          {}", t.id);
    println!("Date:        {}", t.date.format("%Y-%m-%d"));
    println!("Type:        {}", t.kind);
    println!("Category:    {}", t.category);
    println!("Amount:      {}", format_amount(t.amount, symbol));
    println!("Description: {}", t.description);
    if let Some(notes) = &t.notes {
        println!("Notes:       {notes}");
    }
}

fn print_summary<R: TransactionRepository>(repo: &R, period: Period, env: &CliEnv) {
    let symbol = env.config.currency_symbol.as_str();
    let (from, to) = period.range(env.today);
    let s = repo.summary(from, to);

    println!("fintrack - {period}");
    println!("{}", "─".repeat(40));
    println!("  Balance:      {}", format_amount(s.balance, symbol));
    println!("  Income:       {}", format_amount(s.income, symbol));
    println!("  Expenses:     {}", format_amount(s.expenses, symbol));
    println!("  Savings rate: {}%", s.savings_rate);
    println!("  Transactions: {}", s.count);

    let by_category = repo.expenses_by_category(from, to);
    if let Some(max) = by_category.first().map(|(_, total)| *total) {
        println!();
        println!("Expenses by Category:");
        for (category, total) in &by_category {
            let share = if s.expenses > Decimal::ZERO {
                total
                    .checked_div(s.expenses)
                    .map(|r| r.saturating_mul(Decimal::ONE_HUNDRED))
                    .unwrap_or(Decimal::ZERO)
                    .round()
            } else {
                Decimal::ZERO
            };
            println!(
                "  {:<14} {:>14} {:>4}%  {}",
                category.as_str(),
                format_amount(*total, symbol),
                share,
                bar(*total, max, 20),
            );
        }
    }
}

// ── Commands ─────────────────────────────────────────────────

fn cli_dashboard<S: BlobStorage>(ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    print_summary(ledger, Period::All, env);
    println!();
    println!("Recent transactions:");
    print_transactions(
        &ledger.get_recent(env.config.recent_count),
        &env.config.currency_symbol,
    );
    Ok(())
}

fn cli_add<S: BlobStorage>(args: &[String], ledger: &mut Ledger<S>, env: &CliEnv) -> Result<()> {
    let new = parse_new_transaction(args, env.today)?;
    let predicted = flag_value(args, "--category").is_none();
    let txn = ledger.add(new)?;

    println!(
        "Added {} of {} for \"{}\" on {} [id {}]",
        txn.kind,
        format_amount(txn.amount, &env.config.currency_symbol),
        txn.description,
        txn.date.format("%Y-%m-%d"),
        txn.id,
    );
    if predicted {
        println!(
            "Category: {} (predicted; change with `fintrack edit {} --category <name>`)",
            txn.category, txn.id
        );
    } else {
        println!("Category: {}", txn.category);
    }
    Ok(())
}

fn cli_list<S: BlobStorage>(args: &[String], ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    let filter = parse_filter(args)?;
    let txns = ledger.filter(&filter);
    print_transactions(&txns, &env.config.currency_symbol);
    if !txns.is_empty() {
        println!();
        println!("{} of {} transactions", txns.len(), ledger.store().len());
    }
    Ok(())
}

fn cli_show<S: BlobStorage>(args: &[String], ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    let Some(id) = positionals(args).first().copied() else {
        bail!("Usage: fintrack show <id>");
    };
    match ledger.get_by_id(id) {
        Some(t) => print_transaction(t, &env.config.currency_symbol),
        None => println!("No transaction with id {id}"),
    }
    Ok(())
}

fn cli_edit<S: BlobStorage>(args: &[String], ledger: &mut Ledger<S>) -> Result<()> {
    let Some(id) = positionals(args).first().map(|s| s.to_string()) else {
        bail!("Usage: fintrack edit <id> [--amount ..] [--description ..] [--category ..] [--date ..] [--type ..] [--notes ..] [--clear-notes]");
    };
    let patch = parse_patch(args)?;
    if ledger.update(&id, &patch)? {
        println!("Updated {id}");
    } else {
        println!("No transaction with id {id}");
    }
    Ok(())
}

fn cli_delete<S: BlobStorage>(args: &[String], ledger: &mut Ledger<S>) -> Result<()> {
    let Some(id) = positionals(args).first().map(|s| s.to_string()) else {
        bail!("Usage: fintrack delete <id>");
    };
    if ledger.delete(&id)? {
        println!("Deleted {id}");
    } else {
        println!("No transaction with id {id}");
    }
    Ok(())
}

fn cli_recent<S: BlobStorage>(args: &[String], ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    let count = match positionals(args).first() {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("Invalid count: {n}"))?,
        None => env.config.recent_count,
    };
    print_transactions(&ledger.get_recent(count), &env.config.currency_symbol);
    Ok(())
}

fn cli_summary<S: BlobStorage>(args: &[String], ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    let period = match flag_value(args, "--period") {
        Some(p) => parse_period(p)?,
        None => Period::All,
    };
    print_summary(ledger, period, env);
    Ok(())
}

fn cli_predict<S: BlobStorage>(args: &[String], ledger: &Ledger<S>) -> Result<()> {
    let description = positionals(args).join(" ");
    let predictions = ledger.predict_categories(&description);
    let labels: Vec<&str> = predictions.iter().map(Category::as_str).collect();
    println!("{}", labels.join(", "));
    Ok(())
}

fn cli_ask<S: BlobStorage>(args: &[String], ledger: &mut Ledger<S>, env: &CliEnv) -> Result<()> {
    let text = args.join(" ");
    if text.trim().is_empty() {
        bail!("Usage: fintrack ask <text>   e.g. fintrack ask \"bought groceries for 45\"");
    }

    let extractor = GeminiExtractor::new(&env.config.extractor)?;
    match extract::ask(ledger, &extractor, &text, env.today)? {
        AskOutcome::Recorded(txn) => {
            println!(
                "Done! Recorded {} of {} for \"{}\" in category {} [id {}]",
                txn.kind,
                format_amount(txn.amount, &env.config.currency_symbol),
                txn.description,
                txn.category,
                txn.id,
            );
            Ok(())
        }
        AskOutcome::NotUnderstood => {
            println!("Sorry, I couldn't understand the transaction details. Include an amount and a description.");
            Ok(())
        }
        AskOutcome::Failed(e) => {
            eprintln!("Error: {e}");
            bail!("Sorry, I couldn't process that transaction. Please try again.");
        }
    }
}

fn cli_export<S: BlobStorage>(args: &[String], ledger: &Ledger<S>, env: &CliEnv) -> Result<()> {
    let path = positionals(args)
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "finance-tracker-export-{}.json",
                env.today.format("%Y-%m-%d")
            ))
        });

    match ledger.export_to_file(&path) {
        Ok(count) => {
            println!("Exported {count} transactions to {}", path.display());
            Ok(())
        }
        Err(e) => bail!("Failed to export data: {e}"),
    }
}

fn cli_import<S: BlobStorage>(args: &[String], ledger: &mut Ledger<S>) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        bail!("Usage: fintrack import <file.json>");
    };
    let path = PathBuf::from(shellexpand(raw));

    match ledger.import_file(&path) {
        Ok(count) => {
            println!("Imported {count} transactions from {}", path.display());
            Ok(())
        }
        Err(e) => bail!("Failed to import data: {e}. Please check your file and try again."),
    }
}

fn cli_categories() -> Result<()> {
    for kind in [TransactionType::Expense, TransactionType::Income] {
        let names: Vec<&str> = Category::for_type(kind)
            .iter()
            .map(Category::as_str)
            .collect();
        println!("{kind}: {}", names.join(", "));
    }
    Ok(())
}

fn cli_init(env: &CliEnv) -> Result<()> {
    let path = env.data_dir.join(config::CONFIG_FILE);
    if config::init_config(env.data_dir)? {
        println!("Wrote {}", path.display());
    } else {
        println!("Config already exists: {}", path.display());
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
