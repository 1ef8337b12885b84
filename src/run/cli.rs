use anyhow::Result;

use super::format::{format_amount, render_summary, render_transactions};
use crate::config::take_flag;
use crate::models::{
    parse_amount, parse_date, parse_form_date, TransactionType, MAX_AMOUNT,
    MAX_CATEGORY_LEN,
};
use crate::store::Store;

pub(crate) fn as_cli(args: &[String], store: &Store) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_summary(store);
    };
    let rest = args[2..].to_vec();
    match command.as_str() {
        "add" | "a" => cli_add(rest, store),
        "summary" | "s" => cli_summary(store),
        "list" | "ls" => cli_list(rest, store),
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
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack — local, file-backed personal finance tracker");
    println!();
    println!("Usage: fintrack [--file <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none), summary               Print totals, top expense and monthly trend");
    println!("  add <amount> <category> <type>");
    println!("                                Record a transaction (type: income or expense)");
    println!("    --date <YYYY-MM-DD>         Transaction date (default: today, no future dates)");
    println!("  list                          List transactions");
    println!("    --from <YYYY-MM-DD>         First day to include (default: earliest)");
    println!("    --to <YYYY-MM-DD>           Last day to include (default: latest)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    let kinds: Vec<&str> = TransactionType::all().iter().map(|t| t.as_str()).collect();
    println!("Types: {}. Case does not matter.", kinds.join(", "));
    println!("Categories are trimmed and limited to {MAX_CATEGORY_LEN} characters.");
    println!("Amounts must be greater than zero and at most {MAX_AMOUNT}.");
    println!("Set RUST_LOG=info to see storage activity.");
}

fn cli_add(mut args: Vec<String>, store: &Store) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let date = match take_flag(&mut args, "--date")? {
        Some(raw) => parse_form_date(&raw, today)?,
        None => today,
    };

    let [amount, category, kind] = args.as_slice() else {
        anyhow::bail!(
            "Usage: fintrack add <amount> <category> <income|expense> [--date YYYY-MM-DD]"
        );
    };
    let amount = parse_amount(amount)?;

    match store.add_record(date, category, amount, kind) {
        Ok(txn) => {
            println!(
                "Added {} '{}' of {} on {} to {}",
                txn.kind(),
                txn.category(),
                format_amount(txn.amount()),
                txn.date(),
                store.path().display()
            );
            Ok(())
        }
        Err(e) => anyhow::bail!("Failed to add transaction: {e}"),
    }
}

fn cli_summary(store: &Store) -> Result<()> {
    let table = store.load_all();
    if table.is_empty() {
        println!("No data to summarize yet. Add your first transaction with `fintrack add`.");
        return Ok(());
    }
    print!("{}", render_summary(&table));
    Ok(())
}

fn cli_list(mut args: Vec<String>, store: &Store) -> Result<()> {
    let from = take_flag(&mut args, "--from")?;
    let to = take_flag(&mut args, "--to")?;
    if let Some(extra) = args.first() {
        anyhow::bail!("Unexpected argument: {extra}");
    }

    let table = store.load_all();
    let Some((earliest, latest)) = table.date_span() else {
        println!("No transactions available to filter.");
        return Ok(());
    };
    let start = from.as_deref().map(parse_date).transpose()?.unwrap_or(earliest);
    let end = to.as_deref().map(parse_date).transpose()?.unwrap_or(latest);

    let filtered = table.between(start, end)?;
    if filtered.is_empty() {
        println!("No transactions found between {start} and {end}.");
        return Ok(());
    }
    print!("{}", render_transactions(&filtered));
    Ok(())
}
