#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use crate::error::ValidationError;

const HEADER: &str = "date,category,amount,type\n";

fn setup() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("data.csv"));
    (dir, store)
}

fn setup_with(content: &str) -> (TempDir, Store) {
    let (dir, store) = setup();
    fs::write(store.path(), content).unwrap();
    (dir, store)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn txn(date: NaiveDate, category: &str, amount: Decimal, kind: TransactionType) -> Transaction {
    Transaction::new(date, category, amount, kind).unwrap()
}

fn read(store: &Store) -> String {
    fs::read_to_string(store.path()).unwrap()
}

// ── Initialization ────────────────────────────────────────────

#[test]
fn test_load_missing_file_creates_it() {
    let (_dir, store) = setup();
    assert!(!store.path().exists());

    let table = store.load_all();
    assert!(table.is_empty());
    assert!(store.path().exists());
    assert_eq!(read(&store), HEADER);
}

#[test]
fn test_ensure_initialized_is_idempotent() {
    let (_dir, store) = setup();
    store.ensure_initialized().unwrap();
    store.ensure_initialized().unwrap();
    assert_eq!(read(&store), HEADER);
}

#[test]
fn test_ensure_initialized_keeps_existing_data() {
    let content = "date,category,amount,type\n2024-01-15,Groceries,54.32,Expense\n";
    let (_dir, store) = setup_with(content);
    store.ensure_initialized().unwrap();
    assert_eq!(read(&store), content);
}

#[test]
fn test_ensure_initialized_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("nested").join("deeper").join("data.csv"));
    store.ensure_initialized().unwrap();
    assert_eq!(read(&store), HEADER);
}

#[test]
fn test_ensure_initialized_unwritable_location() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where a directory is expected
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let store = Store::new(blocker.join("data.csv"));

    let err = store.ensure_initialized().unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
    assert!(store.load_all().is_empty());
}

// ── Reading ───────────────────────────────────────────────────

#[test]
fn test_load_parses_rows_in_order() {
    let (_dir, store) = setup_with(
        "date,category,amount,type\n\
         2024-01-15,Groceries,54.32,Expense\n\
         2024-01-01,Salary,3000.00,Income\n",
    );
    let table = store.load_all();
    assert_eq!(table.len(), 2);

    let first = &table.records()[0];
    assert_eq!(first.date, day(2024, 1, 15));
    assert_eq!(first.category, "Groceries");
    assert_eq!(first.amount, dec!(54.32));
    assert_eq!(first.transaction_type(), Some(TransactionType::Expense));

    let second = &table.records()[1];
    assert_eq!(second.category, "Salary");
    assert_eq!(second.transaction_type(), Some(TransactionType::Income));
}

#[test]
fn test_load_header_is_case_insensitive() {
    let (_dir, store) = setup_with(" Date , CATEGORY,Amount,Type\n2024-01-15,Food,1.50,Expense\n");
    let table = store.try_load().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.records()[0].amount, dec!(1.50));
}

#[test]
fn test_load_columns_in_any_order() {
    let (_dir, store) = setup_with("type,amount,date,category\nIncome,100,2024-03-01,Gift\n");
    let table = store.try_load().unwrap();
    let rec = &table.records()[0];
    assert_eq!(rec.date, day(2024, 3, 1));
    assert_eq!(rec.category, "Gift");
    assert_eq!(rec.amount, dec!(100));
    assert_eq!(rec.kind, "Income");
}

#[test]
fn test_load_keeps_category_whitespace() {
    let (_dir, store) = setup_with("date,category,amount,type\n2024-01-01, Food ,1,Expense\n");
    let table = store.try_load().unwrap();
    assert_eq!(table.records()[0].category, " Food ");
}

#[test]
fn test_load_keeps_unknown_type() {
    let (_dir, store) = setup_with("date,category,amount,type\n2024-01-01,Move,5,Transfer\n");
    let table = store.try_load().unwrap();
    assert_eq!(table.records()[0].kind, "Transfer");
    assert_eq!(table.records()[0].transaction_type(), None);
}

#[test]
fn test_load_canonicalizes_type_spelling() {
    let (_dir, store) = setup_with(
        "date,category,amount,type\n\
         2024-01-01,Salary,100, income\n\
         2024-01-02,Food,5,EXPENSE\n",
    );
    let table = store.try_load().unwrap();
    assert_eq!(table.records()[0].kind, "Income");
    assert_eq!(table.records()[1].kind, "Expense");
}

#[test]
fn test_load_huge_amounts_then_aggregate() {
    let (_dir, store) = setup_with(
        "date,category,amount,type\n\
         2024-01-01,Salary,0.01,Income\n\
         2024-01-02,Yacht,1000000000000000000000000000,Expense\n\
         2024-01-03,Yacht,79228162514264337593543950335,Expense\n",
    );
    let table = store.load_all();
    assert_eq!(table.len(), 3);
    assert_eq!(crate::aggregate::expense_to_income_ratio(&table), None);
    assert_eq!(
        crate::aggregate::top_expense_category(&table),
        Some(("Yacht".to_string(), dec!(1e27)))
    );
}

#[test]
fn test_load_header_only() {
    let (_dir, store) = setup_with(HEADER);
    assert!(store.try_load().unwrap().is_empty());
}

#[test]
fn test_load_zero_byte_file() {
    let (_dir, store) = setup_with("");
    assert!(store.try_load().unwrap().is_empty());
    assert!(store.load_all().is_empty());
}

#[test]
fn test_load_corrupt_amount_recovers_empty() {
    let (_dir, store) = setup_with(
        "date,category,amount,type\n2024-01-01,Food,abc,Expense\n",
    );
    assert!(store.load_all().is_empty());

    let err = store.try_load().unwrap_err();
    match err {
        StorageError::Corrupt { line, reason } => {
            assert_eq!(line, 2);
            assert!(reason.contains("abc"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_corrupt_date() {
    let (_dir, store) = setup_with("date,category,amount,type\n15/01/2024,Food,1,Expense\n");
    assert!(matches!(
        store.try_load(),
        Err(StorageError::Corrupt { line: 2, .. })
    ));
    assert!(store.load_all().is_empty());
}

#[test]
fn test_load_ragged_row() {
    let (_dir, store) = setup_with("date,category,amount,type\n2024-01-01,Food\n");
    assert!(matches!(store.try_load(), Err(StorageError::Csv(_))));
    assert!(store.load_all().is_empty());
}

#[test]
fn test_load_missing_column() {
    let (_dir, store) = setup_with("date,category,amount\n2024-01-01,Food,1\n");
    assert!(matches!(
        store.try_load(),
        Err(StorageError::MissingColumn("type"))
    ));
    assert!(store.load_all().is_empty());
}

// ── Appending ─────────────────────────────────────────────────

#[test]
fn test_append_roundtrip() {
    let (_dir, store) = setup();
    let t = txn(day(2024, 1, 15), "Groceries", dec!(54.32), TransactionType::Expense);
    store.append(&t).unwrap();

    let table = store.load_all();
    assert_eq!(table.len(), 1);
    assert_eq!(table.records().last(), Some(&Record::from(&t)));
}

#[test]
fn test_append_preserves_insertion_order() {
    let (_dir, store) = setup();
    let later = txn(day(2024, 3, 1), "Rent", dec!(1000), TransactionType::Expense);
    let earlier = txn(day(2024, 1, 1), "Salary", dec!(3000), TransactionType::Income);
    store.append(&later).unwrap();
    store.append(&earlier).unwrap();

    let cats: Vec<String> = store
        .load_all()
        .records()
        .iter()
        .map(|r| r.category.clone())
        .collect();
    assert_eq!(cats, vec!["Rent", "Salary"]);
}

#[test]
fn test_append_writes_canonical_format() {
    let (_dir, store) = setup_with("Date,Category,Amount,Type\n2024-01-15,Groceries,54.32,Expense\n");
    store
        .append(&txn(day(2024, 1, 1), "Salary", dec!(3000), TransactionType::Income))
        .unwrap();

    assert_eq!(
        read(&store),
        "date,category,amount,type\n\
         2024-01-15,Groceries,54.32,Expense\n\
         2024-01-01,Salary,3000.00,Income\n"
    );
}

#[test]
fn test_append_keeps_extra_precision() {
    let (_dir, store) = setup();
    store
        .append(&txn(day(2024, 1, 1), "Fuel", dec!(1.234), TransactionType::Expense))
        .unwrap();
    assert!(read(&store).contains("2024-01-01,Fuel,1.234,Expense"));
}

#[test]
fn test_append_quotes_commas() {
    let (_dir, store) = setup();
    let t = txn(day(2024, 1, 1), "Food, Dining", dec!(12.5), TransactionType::Expense);
    store.append(&t).unwrap();
    assert!(read(&store).contains("\"Food, Dining\""));
    assert_eq!(store.load_all().records().last(), Some(&Record::from(&t)));
}

#[test]
fn test_append_preserves_unknown_rows() {
    let (_dir, store) = setup_with("date,category,amount,type\n2024-01-01,Move,5,Transfer\n");
    store
        .append(&txn(day(2024, 1, 2), "Food", dec!(1), TransactionType::Expense))
        .unwrap();
    let table = store.load_all();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].kind, "Transfer");
}

#[test]
fn test_append_rewrites_type_in_canonical_form() {
    let (_dir, store) = setup_with("date,category,amount,type\n2024-01-01,Salary,100,income\n");
    store
        .append(&txn(day(2024, 1, 2), "Food", dec!(1), TransactionType::Expense))
        .unwrap();
    let content = read(&store);
    assert!(content.contains("2024-01-01,Salary,100.00,Income\n"), "{content}");
    assert!(!content.contains("income"));
}

#[cfg(unix)]
#[test]
fn test_append_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, store) = setup_with(HEADER);
    fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();
    store
        .append(&txn(day(2024, 1, 1), "Food", dec!(1), TransactionType::Expense))
        .unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[cfg(unix)]
#[test]
fn test_new_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, store) = setup();
    store.ensure_initialized().unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn test_append_through_symlink_keeps_link() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.csv");
    let link = dir.path().join("link.csv");
    fs::write(&real, HEADER).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let store = Store::new(&link);
    store
        .append(&txn(day(2024, 1, 1), "Food", dec!(1), TransactionType::Expense))
        .unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert!(fs::read_to_string(&real).unwrap().contains("Food"));
    assert_eq!(store.load_all().len(), 1);
}

#[test]
fn test_append_refuses_corrupt_file() {
    let content = "date,category,amount,type\n2024-01-01,Food,abc,Expense\n";
    let (_dir, store) = setup_with(content);
    let result = store.append(&txn(day(2024, 1, 2), "Rent", dec!(1), TransactionType::Expense));
    assert!(result.is_err());
    assert_eq!(read(&store), content);
}

// ── add_record ────────────────────────────────────────────────

#[test]
fn test_add_record_valid() {
    let (_dir, store) = setup();
    let stored = store
        .add_record(day(2024, 1, 15), "  Groceries ", dec!(54.32), "Expense")
        .unwrap();
    assert_eq!(stored.category(), "Groceries");

    let last = store.load_all().records().last().cloned().unwrap();
    assert_eq!(last.category, "Groceries");
    assert_eq!(last.kind, "Expense");
}

#[test]
fn test_add_record_rejections_leave_file_unchanged() {
    let (_dir, store) = setup();
    store
        .add_record(day(2024, 1, 1), "Salary", dec!(100), "Income")
        .unwrap();
    let before = read(&store);

    let cases = [
        (" ", dec!(10), "Expense"),
        ("", dec!(10), "Expense"),
        ("Food", Decimal::ZERO, "Expense"),
        ("Food", dec!(-5), "Expense"),
        ("Food", dec!(5), "Transfer"),
        ("Yacht", dec!(1e27), "Expense"),
    ];
    for (category, amount, kind) in cases {
        let err = store
            .add_record(day(2024, 1, 2), category, amount, kind)
            .unwrap_err();
        assert!(
            matches!(err, AppendError::Validation(_)),
            "expected validation error for {category:?} {amount} {kind}"
        );
    }

    assert_eq!(read(&store), before);
    assert_eq!(store.load_all().len(), 1);
}

#[test]
fn test_add_record_rejects_amount_over_limit() {
    let (_dir, store) = setup();
    let err = store
        .add_record(day(2024, 1, 1), "Yacht", dec!(1e27), "Expense")
        .unwrap_err();
    assert!(matches!(
        err,
        AppendError::Validation(ValidationError::AmountTooLarge { .. })
    ));
    assert!(store
        .add_record(day(2024, 1, 1), "House", MAX_AMOUNT, "Expense")
        .is_ok());
}

#[test]
fn test_add_record_rejection_does_not_create_file() {
    let (_dir, store) = setup();
    assert!(store.add_record(day(2024, 1, 1), "", dec!(1), "Income").is_err());
    assert!(!store.path().exists());
}

#[test]
fn test_add_record_storage_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let store = Store::new(blocker.join("data.csv"));

    let err = store
        .add_record(day(2024, 1, 1), "Food", dec!(1), "Expense")
        .unwrap_err();
    assert!(matches!(err, AppendError::Storage(_)));
}

// ── amount_field ──────────────────────────────────────────────

#[test]
fn test_amount_field_pads_to_two_places() {
    assert_eq!(amount_field(dec!(3000)), "3000.00");
    assert_eq!(amount_field(dec!(12.5)), "12.50");
    assert_eq!(amount_field(dec!(54.32)), "54.32");
    assert_eq!(amount_field(dec!(0.001)), "0.001");
}
