use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Longest category label the form accepts, in characters.
pub(crate) const MAX_CATEGORY_LEN: usize = 50;

/// Largest amount a single transaction may carry (one trillion). Keeps sums of many rows
/// well inside what [`Decimal`] can represent.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    pub(crate) fn all() -> &'static [TransactionType] {
        &[Self::Income, Self::Expense]
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(ValidationError::UnknownType(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated transaction. The only way to get one is through [`Transaction::new`],
/// so every value satisfies the category and amount rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transaction {
    date: NaiveDate,
    category: String,
    amount: Decimal,
    kind: TransactionType,
}

impl Transaction {
    /// Trims `category` and checks it is non-empty and at most
    /// [`MAX_CATEGORY_LEN`] characters, and that `amount` is positive and no
    /// more than [`MAX_AMOUNT`].
    pub(crate) fn new(
        date: NaiveDate,
        category: &str,
        amount: Decimal,
        kind: TransactionType,
    ) -> Result<Self, ValidationError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        let len = category.chars().count();
        if len > MAX_CATEGORY_LEN {
            return Err(ValidationError::CategoryTooLong {
                len,
                max: MAX_CATEGORY_LEN,
            });
        }
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge {
                amount,
                max: MAX_AMOUNT,
            });
        }

        Ok(Self {
            date,
            category: category.to_string(),
            amount,
            kind,
        })
    }

    pub(crate) fn date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn amount(&self) -> Decimal {
        self.amount
    }

    pub(crate) fn kind(&self) -> TransactionType {
        self.kind
    }
}

/// Parse a form date and reject anything after `today`.
pub(crate) fn parse_form_date(s: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = parse_date(s)?;
    if date > today {
        return Err(ValidationError::FutureDate(date));
    }
    Ok(date)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Accepts plain decimals as well as `$1,234.56` style input.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let cleaned = s.trim().replace(['$', ','], "");
    Decimal::from_str(cleaned.trim()).map_err(|_| ValidationError::InvalidAmount(s.to_string()))
}
