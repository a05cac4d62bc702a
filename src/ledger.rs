use rusqlite::Connection;

use crate::error::{HearthError, Result};
use crate::models::NormalizedTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Inserted,
    /// An entry with the same hash already existed and was updated in place.
    Updated,
}

const UPSERT_SQL: &str = "
INSERT INTO ledger (date, from_account_id, to_account_id, amount, classification, memo, hash)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT(hash) DO UPDATE SET date            = excluded.date,
                                from_account_id = excluded.from_account_id,
                                to_account_id   = excluded.to_account_id,
                                amount          = excluded.amount,
                                classification  = excluded.classification,
                                memo            = excluded.memo;
";

/// Post one normalized transaction as a double-entry ledger row. Negative
/// amounts flow own-account → counterparty, positive the other way; the
/// stored amount is always positive. Re-imports land on the hash key and
/// update the existing row instead of duplicating it.
pub fn post_entry(
    conn: &Connection,
    tx: &NormalizedTransaction,
    own_account_id: i64,
    counterparty_id: i64,
) -> Result<PostOutcome> {
    let (from_id, to_id) = if tx.amount < 0.0 {
        (own_account_id, counterparty_id)
    } else {
        (counterparty_id, own_account_id)
    };

    let existing = conn
        .prepare_cached("SELECT 1 FROM ledger WHERE hash = ?1")
        .and_then(|mut stmt| stmt.exists([&tx.hash]))
        .map_err(|e| HearthError::PersistenceFailed(e.to_string()))?;

    conn.execute(
        UPSERT_SQL,
        rusqlite::params![
            tx.date,
            from_id,
            to_id,
            tx.amount.abs(),
            tx.classification,
            tx.memo,
            tx.hash
        ],
    )
    .map_err(|e| HearthError::PersistenceFailed(e.to_string()))?;

    touch_account(conn, from_id, &tx.date)?;
    touch_account(conn, to_id, &tx.date)?;

    Ok(if existing {
        PostOutcome::Updated
    } else {
        PostOutcome::Inserted
    })
}

/// Stamp activity on a touched account. `last_transaction_at` keeps the
/// latest date seen, so batches with out-of-order rows still end up with the
/// true most-recent activity date.
fn touch_account(conn: &Connection, account_id: i64, date: &str) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET last_transaction_at = MAX(COALESCE(last_transaction_at, ?1), ?1), \
         active = 1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![date, account_id],
    )
    .map_err(|e| HearthError::PersistenceFailed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::matcher::insert_account;
    use crate::models::AccountType;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn tx(date: &str, amount: f64, memo: &str, hash: &str) -> NormalizedTransaction {
        NormalizedTransaction {
            date: date.to_string(),
            amount,
            memo: memo.to_string(),
            classification: None,
            hash: hash.to_string(),
        }
    }

    #[test]
    fn test_outflow_runs_own_to_counterparty() {
        let (_dir, conn) = test_db();
        let shop = insert_account(&conn, "Shop", AccountType::Household, "SHOP").unwrap();
        let outcome = post_entry(&conn, &tx("2025-04-09", -18.60, "SHOP", "h1"), 1, shop).unwrap();
        assert_eq!(outcome, PostOutcome::Inserted);
        let (from, to, amount): (i64, i64, f64) = conn
            .query_row(
                "SELECT from_account_id, to_account_id, amount FROM ledger WHERE hash = 'h1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(from, 1);
        assert_eq!(to, shop);
        assert_eq!(amount, 18.60);
    }

    #[test]
    fn test_inflow_runs_counterparty_to_own() {
        let (_dir, conn) = test_db();
        let payer = insert_account(&conn, "Payroll", AccountType::Income, "PAYROLL").unwrap();
        post_entry(&conn, &tx("2025-04-11", 1200.0, "PAYROLL", "h2"), 1, payer).unwrap();
        let (from, to): (i64, i64) = conn
            .query_row(
                "SELECT from_account_id, to_account_id FROM ledger WHERE hash = 'h2'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(from, payer);
        assert_eq!(to, 1);
    }

    #[test]
    fn test_reposting_same_hash_updates_in_place() {
        let (_dir, conn) = test_db();
        let shop = insert_account(&conn, "Shop", AccountType::Household, "SHOP").unwrap();
        post_entry(&conn, &tx("2025-04-09", -18.60, "SHOP", "h1"), 1, shop).unwrap();
        let outcome =
            post_entry(&conn, &tx("2025-04-09", -20.00, "SHOP corrected", "h1"), 1, shop).unwrap();
        assert_eq!(outcome, PostOutcome::Updated);

        let count: i64 = conn.query_row("SELECT count(*) FROM ledger", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
        let (amount, memo): (f64, String) = conn
            .query_row("SELECT amount, memo FROM ledger WHERE hash = 'h1'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(amount, 20.00);
        assert_eq!(memo, "SHOP corrected");
    }

    #[test]
    fn test_touch_stamps_both_accounts() {
        let (_dir, conn) = test_db();
        let shop = insert_account(&conn, "Shop", AccountType::Household, "SHOP").unwrap();
        conn.execute("UPDATE accounts SET active = 0 WHERE id = 1", []).unwrap();
        post_entry(&conn, &tx("2025-04-09", -18.60, "SHOP", "h1"), 1, shop).unwrap();
        for id in [1, shop] {
            let (active, last): (bool, String) = conn
                .query_row(
                    "SELECT active, last_transaction_at FROM accounts WHERE id = ?1",
                    [id],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .unwrap();
            assert!(active);
            assert_eq!(last, "2025-04-09");
        }
    }

    #[test]
    fn test_activity_date_keeps_latest_on_out_of_order_batch() {
        let (_dir, conn) = test_db();
        let shop = insert_account(&conn, "Shop", AccountType::Household, "SHOP").unwrap();
        post_entry(&conn, &tx("2025-04-11", -5.0, "SHOP", "h1"), 1, shop).unwrap();
        post_entry(&conn, &tx("2025-04-02", -6.0, "SHOP", "h2"), 1, shop).unwrap();
        let last: String = conn
            .query_row("SELECT last_transaction_at FROM accounts WHERE id = ?1", [shop], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(last, "2025-04-11");
    }
}
