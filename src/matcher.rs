use rusqlite::Connection;
use tracing::debug;

use crate::error::{HearthError, Result};
use crate::models::{Account, AccountType};

/// Insert an account row. The match string must be non-empty — an empty one
/// would match every description.
pub fn insert_account(
    conn: &Connection,
    name: &str,
    account_type: AccountType,
    match_string: &str,
) -> Result<i64> {
    if match_string.trim().is_empty() {
        return Err(HearthError::InvalidAccount(
            "match string must not be empty".to_string(),
        ));
    }
    conn.execute(
        "INSERT INTO accounts (name, account_type, match_string, active) VALUES (?1, ?2, ?3, 1)",
        rusqlite::params![name, account_type.as_str(), match_string],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The known accounts for one ingestion run, scanned in stable id order.
/// Accounts provisioned mid-run are appended so later rows in the same batch
/// can match them.
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare(
            "SELECT id, name, account_type, match_string, balance, active, last_transaction_at \
             FROM accounts ORDER BY id",
        )?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    account_type: AccountType::parse(&row.get::<_, String>(2)?)
                        .unwrap_or(AccountType::Unknown),
                    match_string: row.get(3)?,
                    balance: row.get(4)?,
                    active: row.get(5)?,
                    last_transaction_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// First account whose match string occurs in the description,
    /// case-insensitively. Scan order is id order; no ranking by specificity.
    pub fn find(&self, description: &str) -> Option<&Account> {
        let desc = description.to_uppercase();
        self.accounts
            .iter()
            .find(|a| desc.contains(&a.match_string.to_uppercase()))
    }

    /// Resolve a counterparty for the description, provisioning a new Unknown
    /// account when nothing matches.
    pub fn resolve(&mut self, conn: &Connection, description: &str) -> Result<Account> {
        if let Some(account) = self.find(description) {
            return Ok(account.clone());
        }
        self.provision(conn, description)
    }

    fn provision(&mut self, conn: &Connection, description: &str) -> Result<Account> {
        let id = insert_account(conn, description, AccountType::Unknown, description).map_err(
            |e| match e {
                HearthError::InvalidAccount(_) => e,
                other => HearthError::AccountCreateFailed(description.to_string(), other.to_string()),
            },
        )?;
        debug!(account = description, id, "provisioned account");
        let account = Account {
            id,
            name: description.to_string(),
            account_type: AccountType::Unknown,
            match_string: description.to_string(),
            balance: 0.0,
            active: true,
            last_transaction_at: None,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let (_dir, conn) = test_db();
        insert_account(&conn, "Hilltop", AccountType::Household, "hilltop market").unwrap();
        let dir = AccountDirectory::load(&conn).unwrap();
        let found = dir.find("POS PURCHASE HILLTOP MARKET #12").unwrap();
        assert_eq!(found.name, "Hilltop");
    }

    #[test]
    fn test_first_match_wins_over_specificity() {
        let (_dir, conn) = test_db();
        insert_account(&conn, "Market", AccountType::Household, "MARKET").unwrap();
        insert_account(&conn, "Hilltop", AccountType::Household, "HILLTOP MARKET").unwrap();
        let dir = AccountDirectory::load(&conn).unwrap();
        // Both match; the earlier account wins even though the later one is
        // more specific.
        let found = dir.find("HILLTOP MARKET #12").unwrap();
        assert_eq!(found.name, "Market");
    }

    #[test]
    fn test_resolve_provisions_unknown_account() {
        let (_dir, conn) = test_db();
        let mut dir = AccountDirectory::load(&conn).unwrap();
        let before = dir.len();
        let account = dir.resolve(&conn, "HILLTOP MARKET").unwrap();
        assert_eq!(account.account_type, AccountType::Unknown);
        assert_eq!(account.match_string, "HILLTOP MARKET");
        assert!(account.active);
        assert_eq!(dir.len(), before + 1);

        let persisted: i64 = conn
            .query_row(
                "SELECT count(*) FROM accounts WHERE name = 'HILLTOP MARKET' AND account_type = 'unknown'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(persisted, 1);
    }

    #[test]
    fn test_provisioned_account_matches_later_rows() {
        let (_dir, conn) = test_db();
        let mut dir = AccountDirectory::load(&conn).unwrap();
        let first = dir.resolve(&conn, "HILLTOP MARKET").unwrap();
        let second = dir.resolve(&conn, "HILLTOP MARKET #12").unwrap();
        assert_eq!(first.id, second.id);
        let count: i64 = conn
            .query_row("SELECT count(*) FROM accounts WHERE name LIKE 'HILLTOP%'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_match_string_rejected() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            insert_account(&conn, "Bad", AccountType::Other, "  "),
            Err(HearthError::InvalidAccount(_))
        ));
        let mut dir = AccountDirectory::load(&conn).unwrap();
        assert!(matches!(
            dir.resolve(&conn, ""),
            Err(HearthError::InvalidAccount(_))
        ));
    }
}
