mod table;
mod transaction;

pub(crate) use table::{Record, Table};
pub(crate) use transaction::{
    parse_amount, parse_date, parse_form_date, Transaction, TransactionType, DATE_FORMAT,
    MAX_AMOUNT, MAX_CATEGORY_LEN,
};
