use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::{HearthError, Result};
use crate::format::{self, Institution};
use crate::hasher::file_checksum;
use crate::ledger::{post_entry, PostOutcome};
use crate::matcher::{insert_account, AccountDirectory};
use crate::normalizer::normalize_row;
use crate::reader::{read_statement, Statement};

// ---------------------------------------------------------------------------
// Policy and reporting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// A row that fails to parse aborts (and rolls back) the whole batch.
    Abort,
    /// Unparsable rows are logged and skipped; the rest of the batch posts.
    Skip,
}

#[derive(Debug)]
pub struct IngestReport {
    pub filename: String,
    pub institution: Institution,
    /// Entries newly inserted.
    pub written: usize,
    /// Entries that landed on an existing hash and were updated in place.
    pub updated: usize,
    /// Rows filtered by the institution ruleset, plus unparsable rows under
    /// `RowPolicy::Skip`.
    pub skipped: usize,
    pub duplicate_file: bool,
}

impl IngestReport {
    /// Rows that ended up in the ledger, new or upserted.
    pub fn rows_written(&self) -> usize {
        self.written + self.updated
    }
}

#[derive(Default)]
struct BatchStats {
    written: usize,
    updated: usize,
    skipped: usize,
    min_date: Option<String>,
    max_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Ingestion context
// ---------------------------------------------------------------------------

/// Per-run pipeline state: storage handle, detected institution ruleset, the
/// run's own-account id, and the account directory. Built fresh for every
/// upload; nothing survives the request.
struct IngestionContext<'a> {
    conn: &'a Connection,
    institution: Institution,
    own_account_id: i64,
    policy: RowPolicy,
    directory: AccountDirectory,
}

impl<'a> IngestionContext<'a> {
    /// Process rows strictly in file order. Later rows may match accounts
    /// provisioned by earlier rows, so there is no parallelism here.
    fn run(&mut self, stmt: &Statement) -> Result<BatchStats> {
        let mut stats = BatchStats::default();

        for (i, raw) in stmt.rows.iter().enumerate() {
            let tx = match normalize_row(stmt, raw, self.institution, i) {
                Ok(Some(tx)) => tx,
                Ok(None) => {
                    stats.skipped += 1;
                    continue;
                }
                Err(e @ (HearthError::UnparsableAmount { .. } | HearthError::MalformedInput(_)))
                    if self.policy == RowPolicy::Skip =>
                {
                    warn!(row = i, error = %e, "skipping unparsable row");
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let counterparty = self.directory.resolve(self.conn, &tx.memo)?;
            match post_entry(self.conn, &tx, self.own_account_id, counterparty.id)? {
                PostOutcome::Inserted => stats.written += 1,
                PostOutcome::Updated => stats.updated += 1,
            }

            if stats.min_date.as_deref().map_or(true, |d| tx.date.as_str() < d) {
                stats.min_date = Some(tx.date.clone());
            }
            if stats.max_date.as_deref().map_or(true, |d| tx.date.as_str() > d) {
                stats.max_date = Some(tx.date.clone());
            }
        }

        Ok(stats)
    }
}

/// Id of the institution's own account, creating it when the database has
/// never seen this institution.
fn own_account_id(conn: &Connection, institution: Institution) -> Result<i64> {
    let name = institution.own_account_name();
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE name = ?1")?;
    if let Some(id) = stmt
        .query_map([name], |row| row.get::<_, i64>(0))?
        .next()
        .transpose()?
    {
        return Ok(id);
    }
    insert_account(conn, name, institution.own_account_type(), name)
        .map_err(|e| HearthError::AccountCreateFailed(name.to_string(), e.to_string()))
}

// ---------------------------------------------------------------------------
// ingest_file
// ---------------------------------------------------------------------------

/// Run the full ingestion pipeline over one uploaded statement file:
/// detect the format, read the rows, and for each row normalize, hash,
/// match or provision the counterparty, and post a ledger entry. The whole
/// batch runs inside a single transaction, so a failed batch leaves no
/// partial import behind.
pub fn ingest_file(
    conn: &Connection,
    file_path: &Path,
    original_name: Option<&str>,
    format_key: Option<&str>,
    policy: RowPolicy,
) -> Result<IngestReport> {
    let bytes = std::fs::read(file_path)?;
    let checksum = file_checksum(&bytes);
    let content = String::from_utf8(bytes)
        .map_err(|_| HearthError::MalformedInput("statement is not valid UTF-8".to_string()))?;

    let institution = match format_key {
        Some(key) => {
            Institution::from_key(key).ok_or_else(|| HearthError::UnknownFormat(key.to_string()))?
        }
        None => format::detect(&content, original_name)?,
    };

    let filename = original_name
        .map(|n| n.to_string())
        .or_else(|| file_path.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_default();

    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            debug!(%filename, "statement already imported, skipping batch");
            return Ok(IngestReport {
                filename,
                institution,
                written: 0,
                updated: 0,
                skipped: 0,
                duplicate_file: true,
            });
        }
    }

    let statement = read_statement(&content, institution.layout())?;

    let batch = conn.unchecked_transaction()?;
    let mut ctx = IngestionContext {
        conn: &batch,
        institution,
        own_account_id: own_account_id(&batch, institution)?,
        policy,
        directory: AccountDirectory::load(&batch)?,
    };
    let stats = ctx.run(&statement)?;

    batch
        .execute(
            "INSERT INTO imports (filename, institution, row_count, date_range_start, date_range_end, checksum) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                filename,
                institution.key(),
                (stats.written + stats.updated) as i64,
                stats.min_date,
                stats.max_date,
                checksum,
            ],
        )
        .map_err(|e| HearthError::PersistenceFailed(e.to_string()))?;
    batch
        .commit()
        .map_err(|e| HearthError::PersistenceFailed(e.to_string()))?;

    Ok(IngestReport {
        filename,
        institution,
        written: stats.written,
        updated: stats.updated,
        skipped: stats.skipped,
        duplicate_file: false,
    })
}
