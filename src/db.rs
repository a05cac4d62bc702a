use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    account_type TEXT NOT NULL DEFAULT 'unknown',
    match_string TEXT NOT NULL,
    balance REAL NOT NULL DEFAULT 0.0,
    active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    last_transaction_at TEXT
);

CREATE TABLE IF NOT EXISTS ledger (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    from_account_id INTEGER NOT NULL,
    to_account_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    classification TEXT,
    memo TEXT NOT NULL,
    hash TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (from_account_id) REFERENCES accounts(id),
    FOREIGN KEY (to_account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    institution TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    row_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    checksum TEXT
);
";

// (name, account_type, match_string) — the two institutions whose exports the
// importer understands. Created up front so a fresh database can post entries
// against its own accounts.
const SEED_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("Umpqua", "other", "UMPQUA"),
    ("FNBO", "credit_card", "FNBO"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
    )?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if count == 0 {
        for acct in SEED_ACCOUNTS {
            conn.execute(
                "INSERT INTO accounts (name, account_type, match_string, active) VALUES (?1, ?2, ?3, 1)",
                rusqlite::params![acct.0, acct.1, acct.2],
            )?;
        }
    }
    Ok(())
}
