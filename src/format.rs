use crate::error::{HearthError, Result};
use crate::models::AccountType;

/// The bank whose export format dictates column layout and sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Institution {
    /// Checking-account export: headered, Status/Debit/Credit/Description/Post Date.
    Umpqua,
    /// Card export: three fixed columns, Post Date/Amount/Description, no header.
    Fnbo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// First row supplies the column names.
    Headered,
    /// Post Date, Amount, Description.
    FixedThreeColumn,
}

impl Institution {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Umpqua => "umpqua_checking",
            Self::Fnbo => "fnbo_card",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "umpqua_checking" => Some(Self::Umpqua),
            "fnbo_card" => Some(Self::Fnbo),
            _ => None,
        }
    }

    pub fn layout(&self) -> ColumnLayout {
        match self {
            Self::Umpqua => ColumnLayout::Headered,
            Self::Fnbo => ColumnLayout::FixedThreeColumn,
        }
    }

    /// Name of the user's own account at this institution. Every posted entry
    /// has this account on one side of the flow.
    pub fn own_account_name(&self) -> &'static str {
        match self {
            Self::Umpqua => "Umpqua",
            Self::Fnbo => "FNBO",
        }
    }

    pub fn own_account_type(&self) -> AccountType {
        match self {
            Self::Umpqua => AccountType::Other,
            Self::Fnbo => AccountType::CreditCard,
        }
    }
}

// Umpqua checking exports open with this header token; FNBO card exports are
// downloaded as "Transactions....csv" and carry no header at all.
const UMPQUA_HEADER_TOKEN: &str = "Account Number";
const FNBO_FILENAME_PREFIX: &str = "Transactions";

/// Sniff the institution from the first line of the export, falling back to
/// the original filename. Refuses to guess when neither signal is conclusive;
/// an explicit format key skips this entirely.
pub fn detect(content: &str, original_name: Option<&str>) -> Result<Institution> {
    let first_line = content
        .trim_start_matches('\u{feff}')
        .lines()
        .next()
        .unwrap_or("");

    if first_line.starts_with(UMPQUA_HEADER_TOKEN) {
        return Ok(Institution::Umpqua);
    }
    if let Some(name) = original_name {
        if name.starts_with(FNBO_FILENAME_PREFIX) {
            return Ok(Institution::Fnbo);
        }
    }
    if !first_line.is_empty() && first_line.split(',').count() == 3 {
        return Ok(Institution::Fnbo);
    }
    Err(HearthError::FormatDetectionAmbiguous)
}
