use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::error::{HearthError, Result};
use crate::format::Institution;
use crate::hasher::row_hash;
use crate::models::{NormalizedTransaction, RawRow};
use crate::reader::Statement;

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Normalize a statement date to ISO `YYYY-MM-DD`. Accepts `M/D/YYYY` and
/// already-ISO input.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    for fmt in ["%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn strip_amount_noise(raw: &str) -> String {
    Regex::new(r"[^0-9.\-]")
        .map(|re| re.replace_all(raw, "").into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn parse_decimal(raw: &str, row: usize) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| HearthError::UnparsableAmount {
        row,
        value: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Sign strategies
// ---------------------------------------------------------------------------
//
// Both return a signed amount where positive means money flowing into the
// user's own account. The two institutions encode direction differently and
// must not be conflated.

/// Umpqua checking: amount sits in whichever of Debit/Credit is non-empty.
/// Debit rows are money leaving the account, Credit rows money entering it.
fn umpqua_signed_amount(debit: &str, credit: &str, row: usize) -> Result<f64> {
    let (field, sign) = if !debit.trim().is_empty() {
        (debit, -1.0)
    } else if !credit.trim().is_empty() {
        (credit, 1.0)
    } else {
        return Err(HearthError::UnparsableAmount {
            row,
            value: String::new(),
        });
    };
    Ok(sign * parse_decimal(field, row)?)
}

/// FNBO card: one signed Amount column, negative = expense. Currency noise
/// ($, commas) is stripped before parsing; the source's sign is kept.
fn fnbo_signed_amount(raw: &str, row: usize) -> Result<f64> {
    let cleaned = strip_amount_noise(raw);
    if cleaned.is_empty() {
        return Err(HearthError::UnparsableAmount {
            row,
            value: raw.to_string(),
        });
    }
    parse_decimal(&cleaned, row)
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

fn required<'a>(stmt: &Statement, raw: &'a RawRow, name: &str, row: usize) -> Result<&'a str> {
    stmt.field(raw, name).ok_or_else(|| {
        HearthError::MalformedInput(format!("row {}: missing {name} column", row + 1))
    })
}

/// Map one raw row into its canonical form under the institution's rules.
/// Returns `Ok(None)` for rows the ruleset filters out (Umpqua pending
/// transactions, FNBO payment transfers already captured by the checking
/// export).
pub fn normalize_row(
    stmt: &Statement,
    raw: &RawRow,
    institution: Institution,
    row: usize,
) -> Result<Option<NormalizedTransaction>> {
    let description = required(stmt, raw, "Description", row)?;
    let date_raw = required(stmt, raw, "Post Date", row)?;

    let amount = match institution {
        Institution::Umpqua => {
            if stmt.field(raw, "Status") == Some("Pending") {
                debug!(row, "skipping pending row");
                return Ok(None);
            }
            let debit = required(stmt, raw, "Debit", row)?;
            let credit = required(stmt, raw, "Credit", row)?;
            umpqua_signed_amount(debit, credit, row)?
        }
        Institution::Fnbo => {
            if description.starts_with("PAYMENT") {
                debug!(row, "skipping payment transfer row");
                return Ok(None);
            }
            fnbo_signed_amount(required(stmt, raw, "Amount", row)?, row)?
        }
    };

    let date = normalize_date(date_raw).ok_or_else(|| {
        HearthError::MalformedInput(format!("row {}: bad date {date_raw:?}", row + 1))
    })?;

    let classification = stmt
        .field(raw, "Classification")
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string());

    Ok(Some(NormalizedTransaction {
        date,
        amount,
        memo: description.to_string(),
        classification,
        hash: row_hash(&raw.values),
    }))
}
