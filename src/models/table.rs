use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{Transaction, TransactionType};
use crate::error::ValidationError;

/// One row of the backing file.
///
/// `kind` holds the canonical type name when the stored text is recognised,
/// and the text exactly as stored otherwise, so a row with an unexpected type
/// survives a load/rewrite cycle. Use [`Record::transaction_type`] to
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
    pub kind: String,
}

impl Record {
    pub(crate) fn transaction_type(&self) -> Option<TransactionType> {
        self.kind.parse().ok()
    }

    /// Calendar month of the record, formatted `YYYY-MM`.
    pub(crate) fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

impl From<&Transaction> for Record {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.date(),
            category: txn.category().to_string(),
            amount: txn.amount(),
            kind: txn.kind().as_str().to_string(),
        }
    }
}

/// All records in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Table {
    records: Vec<Record>,
}

impl Table {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Earliest and latest dates in the table.
    pub(crate) fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Records dated within `start..=end`, in their original order.
    pub(crate) fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<Table, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect())
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
