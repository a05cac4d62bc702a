use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Income,
    Bill,
    Household,
    CreditCard,
    Loan,
    Other,
    Unknown,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Bill => "bill",
            Self::Household => "household",
            Self::CreditCard => "credit_card",
            Self::Loan => "loan",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "bill" => Some(Self::Bill),
            "household" => Some(Self::Household),
            "credit_card" => Some(Self::CreditCard),
            "loan" => Some(Self::Loan),
            "other" => Some(Self::Other),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// A payee, category, or one of the user's own bank accounts.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    /// Substring matched case-insensitively against statement descriptions.
    pub match_string: String,
    pub balance: f64,
    pub active: bool,
    pub last_transaction_at: Option<String>,
}

/// One posted, double-entry ledger row.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub id: Option<i64>,
    pub date: String,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: f64,
    pub classification: Option<String>,
    pub memo: String,
    pub hash: String,
}

/// One statement line as read, values in file-column order.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub values: Vec<String>,
}

/// Canonical form of a statement row, ready for posting.
/// `amount` is signed: positive means money flowing into the user's own
/// account, negative means money leaving it.
#[derive(Debug, Clone)]
pub struct NormalizedTransaction {
    pub date: String,
    pub amount: f64,
    pub memo: String,
    pub classification: Option<String>,
    pub hash: String,
}
