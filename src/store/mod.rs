use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

use crate::error::{AppendError, StorageError};
use crate::models::*;

/// Header of the backing file, in the order it is written.
pub(crate) const COLUMNS: [&str; 4] = ["date", "category", "amount", "type"];

/// Owns the CSV file that holds every transaction.
///
/// Every operation reads or rewrites the whole file. There is no locking:
/// two processes appending at the same time can lose one of the records.
///
/// Rewrites go to a temporary file that is renamed over the target. An
/// existing file keeps its permissions and a symlinked path keeps its link;
/// a file created from scratch is readable by its owner only.
pub(crate) struct Store {
    path: PathBuf,
}

impl Store {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file with just a header if it does not exist yet.
    pub(crate) fn ensure_initialized(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = parent_dir(&self.path) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        self.write_table(&Table::new())?;
        tracing::info!("Created new data file: {}", self.path.display());
        Ok(())
    }

    /// Read every record, falling back to an empty table when the file
    /// cannot be read or parsed.
    pub(crate) fn load_all(&self) -> Table {
        match self.try_load() {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    "Could not load {}, showing no transactions: {e}",
                    self.path.display()
                );
                Table::new()
            }
        }
    }

    /// Read every record, failing on anything that does not parse.
    pub(crate) fn try_load(&self) -> Result<Table, StorageError> {
        self.ensure_initialized()?;
        let file = File::open(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = rdr.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            tracing::warn!("Data file {} is empty", self.path.display());
            return Ok(Table::new());
        }
        let columns = Columns::locate(&headers)?;

        let mut table = Table::new();
        for result in rdr.records() {
            table.push(columns.parse(&result?)?);
        }
        tracing::info!("Loaded {} records from {}", table.len(), self.path.display());
        Ok(table)
    }

    /// Add `txn` as the last row and rewrite the file.
    ///
    /// The existing file is read strictly first, so a corrupt file makes this
    /// fail instead of being replaced by a file holding only the new row.
    pub(crate) fn append(&self, txn: &Transaction) -> Result<(), StorageError> {
        let mut table = self.try_load()?;
        table.push(Record::from(txn));
        self.write_table(&table)?;
        tracing::info!(
            "Added new record: {} {} {} {}",
            txn.date(),
            txn.category(),
            txn.amount(),
            txn.kind()
        );
        Ok(())
    }

    /// Validate raw fields and append them.
    ///
    /// Invalid input is rejected before the file is touched. Returns the
    /// stored transaction.
    pub(crate) fn add_record(
        &self,
        date: NaiveDate,
        category: &str,
        amount: Decimal,
        kind: &str,
    ) -> Result<Transaction, AppendError> {
        let txn = kind
            .parse::<TransactionType>()
            .and_then(|kind| Transaction::new(date, category, amount, kind))
            .inspect_err(|e| tracing::error!("Rejected record: {e}"))?;
        self.append(&txn)
            .inspect_err(|e| tracing::error!("Error adding record: {e}"))?;
        Ok(txn)
    }

    /// Write `table` to a temporary file next to the real backing file, then
    /// rename it into place.
    fn write_table(&self, table: &Table) -> Result<(), StorageError> {
        // Resolve symlinks so the rename replaces the link target, not the link.
        let target = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = parent_dir(&target).unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        if let Ok(meta) = fs::metadata(&target) {
            fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| StorageError::io(tmp.path(), e))?;
        }
        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file());
            wtr.write_record(COLUMNS)?;
            for record in table.records() {
                wtr.write_record([
                    record.date.format(DATE_FORMAT).to_string(),
                    record.category.clone(),
                    amount_field(record.amount),
                    record.kind.clone(),
                ])?;
            }
            wtr.flush().map_err(|e| StorageError::io(tmp.path(), e))?;
        }
        tmp.persist(&target)
            .map_err(|e| StorageError::io(&target, e.error))?;
        Ok(())
    }
}

/// Position of each canonical column in the file's header row.
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
    kind: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, StorageError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(StorageError::MissingColumn(name))
        };
        Ok(Self {
            date: find(COLUMNS[0])?,
            category: find(COLUMNS[1])?,
            amount: find(COLUMNS[2])?,
            kind: find(COLUMNS[3])?,
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<Record, StorageError> {
        let line = row.position().map_or(0, |p| p.line());

        let date_text = field(row, self.date).trim();
        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|_| {
            StorageError::Corrupt {
                line,
                reason: format!("invalid date '{date_text}'"),
            }
        })?;

        let amount_text = field(row, self.amount).trim();
        let amount = Decimal::from_str(amount_text).map_err(|_| StorageError::Corrupt {
            line,
            reason: format!("invalid amount '{amount_text}'"),
        })?;

        // Recognised types are stored in their canonical spelling so the
        // file always agrees with how the row is aggregated.
        let kind_text = field(row, self.kind).trim();
        let kind = match kind_text.parse::<TransactionType>() {
            Ok(kind) => kind.as_str().to_string(),
            Err(_) => kind_text.to_string(),
        };

        Ok(Record {
            date,
            category: field(row, self.category).to_string(),
            amount,
            kind,
        })
    }
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Amounts keep at least two fractional digits on disk: `3000` is written as
/// `3000.00`, `54.325` stays as is.
fn amount_field(amount: Decimal) -> String {
    let mut amount = amount;
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    amount.to_string()
}

#[cfg(test)]
mod tests;
