use std::path::PathBuf;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::ingest::{ingest_file, RowPolicy};
use crate::settings::get_data_dir;

pub fn run(file: &str, format: Option<&str>, skip_bad_rows: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = get_connection(&get_data_dir().join("hearth.db"))?;

    let policy = if skip_bad_rows { RowPolicy::Skip } else { RowPolicy::Abort };
    let original_name = file_path.file_name().map(|n| n.to_string_lossy().to_string());

    let report = ingest_file(&conn, &file_path, original_name.as_deref(), format, policy)?;

    if report.duplicate_file {
        println!("{}", "This file has already been imported (duplicate checksum).".yellow());
        return Ok(());
    }

    println!(
        "{} statement: {} written, {} updated, {} skipped",
        report.institution.key(),
        report.written,
        report.updated,
        report.skipped
    );
    Ok(())
}
